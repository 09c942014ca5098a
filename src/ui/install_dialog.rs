use gtk4::glib::SignalHandlerId;
use gtk4::prelude::*;
use gtk4::{
    Box, Button, CheckButton, DropDown, Entry, FileChooserAction, FileChooserNative, Grid, Label,
    Orientation, ResponseType, Spinner, Stack, StringList, Window,
};
use relm4::{Component, ComponentParts, ComponentSender, RelmWidgetExt};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::core::dialog::{ConfirmAction, DialogInit, FollowUp, InstallDialogState, LoadTicket};
use crate::core::dispatch::dispatch_and_report;
use crate::core::language::language_display_name;
use crate::core::loader::{
    fetch_app_settings, fetch_game_info, fetch_install_info, fetch_installer_languages,
    LoadEvent,
};
use crate::core::model::InstallOutcome;
use crate::core::services::Services;

pub struct InstallDialogInit {
    pub dialog: DialogInit,
    pub services: Services,
    /// Quit the application once the dialog is done. Set when the dialog is
    /// the only window.
    pub standalone: bool,
}

#[derive(Debug)]
pub enum InstallDialogMsg {
    InstallPathEdited(String),
    BrowseInstallPath,
    InstallPathPicked(Option<PathBuf>),
    WinePrefixEdited(String),
    BrowseWinePrefix,
    WinePrefixPicked(Option<PathBuf>),
    LanguageSelected(u32),
    ToggleDlcs,
    ToggleSelective(String),
    LocalesChanged(Vec<String>),
    /// Show the dialog for another title.
    Retarget(DialogInit),
    Import,
    Install,
    /// Close button or Escape.
    Close,
    /// The window went away, however it was closed.
    WindowClosed,
}

#[derive(Debug)]
pub enum InstallDialogCmd {
    Loaded(LoadEvent),
    Dispatched,
}

/// `Closed` is sent as soon as the user confirms. The install itself runs on
/// a detached task and reports `InstallStarted` or `Failed` afterwards, also
/// when the host has already dropped the dialog.
#[derive(Debug)]
pub enum InstallDialogOutput {
    Closed,
    InstallStarted {
        app_name: String,
        outcome: InstallOutcome,
    },
    Failed(String),
}

pub struct InstallDialog {
    state: InstallDialogState,
    services: Services,
    standalone: bool,
    picker: Option<FileChooserNative>,
}

pub struct InstallDialogWidgets {
    stack: Stack,
    title_label: Label,
    platform_label: Label,
    download_size_label: Label,
    install_size_label: Label,
    language_row: Box,
    language_dropdown: DropDown,
    language_model: StringList,
    language_handler: SignalHandlerId,
    rendered_languages: Vec<String>,
    install_path_entry: Entry,
    install_path_handler: SignalHandlerId,
    install_progress_label: Label,
    prefix_row: Box,
    prefix_entry: Entry,
    prefix_handler: SignalHandlerId,
    prefix_progress_label: Label,
    dlc_section: Box,
    dlc_list: Box,
    dlc_check: CheckButton,
    dlc_handler: SignalHandlerId,
    rendered_dlcs: Vec<String>,
    sdl_section: Box,
    sdl_checks: Vec<(CheckButton, SignalHandlerId, String)>,
    install_button: Button,
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn set_entry_text(entry: &Entry, handler: &SignalHandlerId, text: &str) {
    if entry.text().as_str() != text {
        entry.block_signal(handler);
        entry.set_text(text);
        entry.unblock_signal(handler);
    }
}

fn clear_box(container: &Box) {
    while let Some(child) = container.first_child() {
        container.remove(&child);
    }
}

fn section_title(text: &str) -> Label {
    let label = Label::new(Some(text));
    label.set_halign(gtk4::Align::Start);
    label.set_css_classes(&["section-title"]);
    label
}

impl InstallDialog {
    fn start_load(&self, ticket: LoadTicket, sender: &ComponentSender<Self>) {
        let app_name = self.state.app_name().to_string();
        let runner = self.state.runner();

        let services = self.services.clone();
        let name = app_name.clone();
        sender.oneshot_command(async move {
            InstallDialogCmd::Loaded(fetch_install_info(services, name, runner, ticket).await)
        });

        let services = self.services.clone();
        sender.oneshot_command(async move {
            InstallDialogCmd::Loaded(fetch_game_info(services, app_name, runner, ticket).await)
        });

        let services = self.services.clone();
        sender.oneshot_command(async move {
            InstallDialogCmd::Loaded(fetch_app_settings(services, ticket).await)
        });
    }

    fn handle_loaded(&mut self, event: LoadEvent, sender: &ComponentSender<Self>) {
        match self.state.apply(event) {
            Ok(Some(FollowUp::FetchInstallerLanguages(ticket))) => {
                let services = self.services.clone();
                let app_name = self.state.app_name().to_string();
                sender.oneshot_command(async move {
                    InstallDialogCmd::Loaded(
                        fetch_installer_languages(services, app_name, ticket).await,
                    )
                });
            }
            Ok(None) => {}
            Err(err) => {
                error!(app_name = %self.state.app_name(), "{:#}", err);
                let _ = sender.output(InstallDialogOutput::Failed(format!("{:#}", err)));
            }
        }
    }

    fn open_picker(
        &mut self,
        root: &Window,
        sender: &ComponentSender<Self>,
        title: &str,
        on_pick: fn(Option<PathBuf>) -> InstallDialogMsg,
    ) {
        if let Some(picker) = self.picker.take() {
            picker.destroy();
        }

        let picker = FileChooserNative::builder()
            .title(title)
            .action(FileChooserAction::SelectFolder)
            .accept_label("Choose")
            .cancel_label("Cancel")
            .transient_for(root)
            .build();

        let sender_clone = sender.clone();
        picker.connect_response(move |picker, response| {
            let path = if response == ResponseType::Accept {
                picker.file().and_then(|file| file.path())
            } else {
                None
            };
            sender_clone.input(on_pick(path));
        });

        picker.show();
        self.picker = Some(picker);
    }

    fn confirm(&mut self, action: ConfirmAction, root: &Window, sender: &ComponentSender<Self>) {
        let plan = match self.state.confirm(action) {
            Ok(Some(plan)) => plan,
            Ok(None) => return,
            Err(err) => {
                error!("{:#}", err);
                let _ = sender.output(InstallDialogOutput::Failed(format!("{:#}", err)));
                return;
            }
        };

        root.set_visible(false);
        let _ = sender.output(InstallDialogOutput::Closed);

        let output = sender.output_sender().clone();
        let commands = sender.command_sender().clone();
        relm4::spawn(dispatch_and_report(
            self.services.clone(),
            plan,
            move |app_name, result| {
                let message = match result {
                    Ok(outcome) => InstallDialogOutput::InstallStarted { app_name, outcome },
                    Err(err) => InstallDialogOutput::Failed(format!("{:#}", err)),
                };
                let _ = output.send(message);
                let _ = commands.send(InstallDialogCmd::Dispatched);
            },
        ));
    }

    fn finish(&self) {
        if self.standalone {
            relm4::main_application().quit();
        }
    }

    fn build_content(sender: &ComponentSender<Self>) -> (Stack, InstallDialogWidgets) {
        let stack = Stack::new();

        // Loading page
        let loading = Box::new(Orientation::Vertical, 12);
        loading.set_valign(gtk4::Align::Center);
        let spinner = Spinner::new();
        spinner.start();
        loading.append(&spinner);
        loading.append(&Label::new(Some("Loading game information...")));
        stack.add_named(&loading, Some("loading"));

        let vbox = Box::new(Orientation::Vertical, 15);
        vbox.set_margin_all(20);

        // Title
        let header = Box::new(Orientation::Horizontal, 10);
        let title_label = Label::new(None);
        title_label.set_css_classes(&["title-2"]);
        title_label.set_halign(gtk4::Align::Start);
        title_label.set_hexpand(true);
        title_label.set_wrap(true);
        header.append(&title_label);
        let platform_label = Label::new(None);
        platform_label.set_css_classes(&["platform-badge"]);
        header.append(&platform_label);
        vbox.append(&header);

        // Sizes
        let sizes = Grid::new();
        sizes.set_row_spacing(6);
        sizes.set_column_spacing(10);
        sizes.attach(&Label::new(Some("Download Size:")), 0, 0, 1, 1);
        let download_size_label = Label::new(None);
        download_size_label.set_halign(gtk4::Align::Start);
        sizes.attach(&download_size_label, 1, 0, 1, 1);
        sizes.attach(&Label::new(Some("Install Size:")), 0, 1, 1, 1);
        let install_size_label = Label::new(None);
        install_size_label.set_halign(gtk4::Align::Start);
        sizes.attach(&install_size_label, 1, 1, 1, 1);
        vbox.append(&sizes);

        // Language
        let language_row = Box::new(Orientation::Horizontal, 10);
        language_row.append(&Label::new(Some("Language:")));
        let language_model = StringList::new(&[]);
        let language_dropdown = DropDown::new(Some(language_model.clone()), None::<gtk4::Expression>);
        language_dropdown.set_hexpand(true);
        let sender_clone = sender.clone();
        let language_handler = language_dropdown.connect_selected_notify(move |dropdown| {
            sender_clone.input(InstallDialogMsg::LanguageSelected(dropdown.selected()));
        });
        language_row.append(&language_dropdown);
        vbox.append(&language_row);

        vbox.append(&gtk4::Separator::new(Orientation::Horizontal));

        // Install path
        vbox.append(&section_title("Select Install Path"));
        let path_box = Box::new(Orientation::Horizontal, 10);
        let install_path_entry = Entry::new();
        install_path_entry.set_hexpand(true);
        let sender_clone = sender.clone();
        let install_path_handler = install_path_entry.connect_changed(move |entry| {
            sender_clone.input(InstallDialogMsg::InstallPathEdited(entry.text().to_string()));
        });
        path_box.append(&install_path_entry);
        let browse_btn = Button::from_icon_name("folder-open-symbolic");
        let sender_clone = sender.clone();
        browse_btn.connect_clicked(move |_| sender_clone.input(InstallDialogMsg::BrowseInstallPath));
        path_box.append(&browse_btn);
        vbox.append(&path_box);
        let install_progress_label = Label::new(None);
        install_progress_label.set_halign(gtk4::Align::Start);
        install_progress_label.set_css_classes(&["dim-label"]);
        vbox.append(&install_progress_label);

        // Wine prefix
        let prefix_row = Box::new(Orientation::Vertical, 6);
        prefix_row.append(&section_title("WinePrefix"));
        let prefix_box = Box::new(Orientation::Horizontal, 10);
        let prefix_entry = Entry::new();
        prefix_entry.set_hexpand(true);
        let sender_clone = sender.clone();
        let prefix_handler = prefix_entry.connect_changed(move |entry| {
            sender_clone.input(InstallDialogMsg::WinePrefixEdited(entry.text().to_string()));
        });
        prefix_box.append(&prefix_entry);
        let prefix_btn = Button::from_icon_name("folder-open-symbolic");
        let sender_clone = sender.clone();
        prefix_btn.connect_clicked(move |_| sender_clone.input(InstallDialogMsg::BrowseWinePrefix));
        prefix_box.append(&prefix_btn);
        prefix_row.append(&prefix_box);
        let prefix_progress_label = Label::new(None);
        prefix_progress_label.set_halign(gtk4::Align::Start);
        prefix_progress_label.set_css_classes(&["dim-label"]);
        prefix_row.append(&prefix_progress_label);
        vbox.append(&prefix_row);

        // DLCs
        let dlc_section = Box::new(Orientation::Vertical, 6);
        dlc_section.set_css_classes(&["card"]);
        dlc_section.append(&section_title("DLCs"));
        let dlc_list = Box::new(Orientation::Vertical, 4);
        dlc_section.append(&dlc_list);
        let dlc_check = CheckButton::with_label("Install all DLCs");
        let sender_clone = sender.clone();
        let dlc_handler =
            dlc_check.connect_toggled(move |_| sender_clone.input(InstallDialogMsg::ToggleDlcs));
        dlc_section.append(&dlc_check);
        vbox.append(&dlc_section);

        // Selective downloads
        let sdl_section = Box::new(Orientation::Vertical, 6);
        sdl_section.set_css_classes(&["card"]);
        sdl_section.append(&section_title("Select components to Install"));
        vbox.append(&sdl_section);

        // Actions
        let buttons = Box::new(Orientation::Horizontal, 10);
        buttons.set_halign(gtk4::Align::End);
        buttons.set_margin_top(10);
        let import_btn = Button::with_label("Import");
        import_btn.set_css_classes(&["outline"]);
        let sender_clone = sender.clone();
        import_btn.connect_clicked(move |_| sender_clone.input(InstallDialogMsg::Import));
        buttons.append(&import_btn);
        let install_button = Button::with_label("Install");
        install_button.set_css_classes(&["suggested-action"]);
        let sender_clone = sender.clone();
        install_button.connect_clicked(move |_| sender_clone.input(InstallDialogMsg::Install));
        buttons.append(&install_button);
        vbox.append(&buttons);

        let scroll = gtk4::ScrolledWindow::new();
        scroll.set_vexpand(true);
        scroll.set_child(Some(&vbox));
        stack.add_named(&scroll, Some("form"));

        let widgets = InstallDialogWidgets {
            stack: stack.clone(),
            title_label,
            platform_label,
            download_size_label,
            install_size_label,
            language_row,
            language_dropdown,
            language_model,
            language_handler,
            rendered_languages: Vec::new(),
            install_path_entry,
            install_path_handler,
            install_progress_label,
            prefix_row,
            prefix_entry,
            prefix_handler,
            prefix_progress_label,
            dlc_section,
            dlc_list,
            dlc_check,
            dlc_handler,
            rendered_dlcs: Vec::new(),
            sdl_section,
            sdl_checks: Vec::new(),
            install_button,
        };

        (stack, widgets)
    }

    fn build_selective_downloads(
        &self,
        widgets: &mut InstallDialogWidgets,
        sender: &ComponentSender<Self>,
    ) {
        for (check, _, _) in widgets.sdl_checks.drain(..) {
            widgets.sdl_section.remove(&check);
        }
        for entry in self.state.optional_downloads() {
            let check = CheckButton::with_label(&entry.name);
            let sender_clone = sender.clone();
            let name = entry.name.clone();
            let handler = check.connect_toggled(move |_| {
                sender_clone.input(InstallDialogMsg::ToggleSelective(name.clone()));
            });
            widgets.sdl_section.append(&check);
            widgets.sdl_checks.push((check, handler, entry.name.clone()));
        }
    }

    fn refresh(&self, widgets: &mut InstallDialogWidgets) {
        let state = &self.state;

        if !state.is_loaded() {
            widgets.stack.set_visible_child_name("loading");
            return;
        }
        widgets.stack.set_visible_child_name("form");

        widgets.title_label.set_label(state.title().unwrap_or_default());
        widgets.platform_label.set_label(state.platform_badge().label());
        widgets
            .download_size_label
            .set_label(state.download_size().as_deref().unwrap_or("-"));
        widgets
            .install_size_label
            .set_label(state.install_size().as_deref().unwrap_or("-"));

        // Language
        widgets.language_row.set_visible(state.shows_language_picker());
        if widgets.rendered_languages.as_slice() != state.languages() {
            let names: Vec<String> = state
                .languages()
                .iter()
                .map(|l| language_display_name(l))
                .collect();
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            widgets.language_dropdown.block_signal(&widgets.language_handler);
            widgets
                .language_model
                .splice(0, widgets.language_model.n_items(), &names);
            widgets.language_dropdown.unblock_signal(&widgets.language_handler);
            widgets.rendered_languages = state.languages().to_vec();
        }
        if let Some(pos) = state
            .language()
            .and_then(|lang| state.languages().iter().position(|l| l == lang))
        {
            if widgets.language_dropdown.selected() != pos as u32 {
                widgets.language_dropdown.block_signal(&widgets.language_handler);
                widgets.language_dropdown.set_selected(pos as u32);
                widgets.language_dropdown.unblock_signal(&widgets.language_handler);
            }
        }

        // Paths
        set_entry_text(
            &widgets.install_path_entry,
            &widgets.install_path_handler,
            &display_path(state.install_path()),
        );
        widgets
            .install_path_entry
            .set_placeholder_text(state.default_install_path().and_then(Path::to_str));

        let progress_text = state
            .downloaded_percent()
            .map(|percent| format!("Total Downloaded {}%", percent))
            .unwrap_or_default();
        widgets.install_progress_label.set_label(&progress_text);
        widgets
            .install_progress_label
            .set_visible(!progress_text.is_empty());

        widgets.prefix_row.set_visible(state.shows_wine_prefix());
        let prefix_text = display_path(state.wine_prefix());
        set_entry_text(&widgets.prefix_entry, &widgets.prefix_handler, &prefix_text);
        widgets.prefix_entry.set_placeholder_text(Some(&prefix_text));
        widgets.prefix_progress_label.set_label(&progress_text);
        widgets
            .prefix_progress_label
            .set_visible(!progress_text.is_empty());

        // DLCs
        widgets.dlc_section.set_visible(state.has_dlcs());
        let dlc_titles: Vec<String> = state.dlcs().iter().map(|d| d.title.clone()).collect();
        if widgets.rendered_dlcs != dlc_titles {
            clear_box(&widgets.dlc_list);
            for title in &dlc_titles {
                let label = Label::new(Some(title));
                label.set_halign(gtk4::Align::Start);
                widgets.dlc_list.append(&label);
            }
            widgets.rendered_dlcs = dlc_titles;
        }
        if widgets.dlc_check.is_active() != state.install_dlcs() {
            widgets.dlc_check.block_signal(&widgets.dlc_handler);
            widgets.dlc_check.set_active(state.install_dlcs());
            widgets.dlc_check.unblock_signal(&widgets.dlc_handler);
        }

        // Selective downloads
        widgets.sdl_section.set_visible(state.has_selective_downloads());
        for (check, handler, name) in &widgets.sdl_checks {
            let selected = state
                .optional_downloads()
                .find(|e| &e.name == name)
                .map(|e| state.is_selected(e))
                .unwrap_or(false);
            if check.is_active() != selected {
                check.block_signal(handler);
                check.set_active(selected);
                check.unblock_signal(handler);
            }
        }

        widgets.install_button.set_label(state.primary_action().label());
        widgets.install_button.set_sensitive(state.can_install());
    }
}

impl Component for InstallDialog {
    type CommandOutput = InstallDialogCmd;
    type Input = InstallDialogMsg;
    type Output = InstallDialogOutput;
    type Init = InstallDialogInit;
    type Root = Window;
    type Widgets = InstallDialogWidgets;

    fn init_root() -> Self::Root {
        Window::builder()
            .title("Install Game")
            .modal(true)
            .default_width(640)
            .default_height(620)
            .hide_on_close(true)
            .build()
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let mut model = InstallDialog {
            state: InstallDialogState::new(init.dialog),
            services: init.services,
            standalone: init.standalone,
            picker: None,
        };

        let (content, mut widgets) = Self::build_content(&sender);
        root.set_child(Some(&content));

        let sender_clone = sender.clone();
        root.connect_close_request(move |_| {
            sender_clone.input(InstallDialogMsg::WindowClosed);
            gtk4::glib::Propagation::Proceed
        });

        let keys = gtk4::EventControllerKey::new();
        let sender_clone = sender.clone();
        keys.connect_key_pressed(move |_, key, _, _| {
            if key == gtk4::gdk::Key::Escape {
                sender_clone.input(InstallDialogMsg::Close);
                gtk4::glib::Propagation::Stop
            } else {
                gtk4::glib::Propagation::Proceed
            }
        });
        root.add_controller(keys);

        model.build_selective_downloads(&mut widgets, &sender);

        let ticket = model.state.begin_load();
        model.start_load(ticket, &sender);
        model.refresh(&mut widgets);

        info!(app_name = %model.state.app_name(), runner = %model.state.runner(), "Opening install dialog");
        root.present();

        ComponentParts { model, widgets }
    }

    fn update_with_view(
        &mut self,
        widgets: &mut Self::Widgets,
        msg: Self::Input,
        sender: ComponentSender<Self>,
        root: &Self::Root,
    ) {
        match msg {
            InstallDialogMsg::InstallPathEdited(text) => self.state.set_install_path_text(&text),
            InstallDialogMsg::BrowseInstallPath => self.open_picker(
                root,
                &sender,
                "Select Install Path",
                InstallDialogMsg::InstallPathPicked,
            ),
            InstallDialogMsg::InstallPathPicked(path) => {
                self.state.apply_picked_install_path(path)
            }
            InstallDialogMsg::WinePrefixEdited(text) => self.state.set_wine_prefix_text(&text),
            InstallDialogMsg::BrowseWinePrefix => self.open_picker(
                root,
                &sender,
                "Select WinePrefix Folder",
                InstallDialogMsg::WinePrefixPicked,
            ),
            InstallDialogMsg::WinePrefixPicked(path) => self.state.apply_picked_wine_prefix(path),
            InstallDialogMsg::LanguageSelected(index) => {
                if let Some(language) = self.state.languages().get(index as usize).cloned() {
                    self.state.select_language(&language);
                }
            }
            InstallDialogMsg::ToggleDlcs => self.state.toggle_dlcs(),
            InstallDialogMsg::ToggleSelective(name) => {
                self.state.toggle_selective(&name);
            }
            InstallDialogMsg::LocalesChanged(locales) => {
                let ticket = self.state.set_preferred_locales(locales);
                self.start_load(ticket, &sender);
            }
            InstallDialogMsg::Retarget(init) => {
                let ticket = self.state.retarget(init);
                self.build_selective_downloads(widgets, &sender);
                self.start_load(ticket, &sender);
                info!(app_name = %self.state.app_name(), runner = %self.state.runner(), "Retargeting install dialog");
                root.present();
            }
            InstallDialogMsg::Import => self.confirm(ConfirmAction::Import, root, &sender),
            InstallDialogMsg::Install => self.confirm(ConfirmAction::Install, root, &sender),
            InstallDialogMsg::Close => root.close(),
            InstallDialogMsg::WindowClosed => {
                if !self.state.is_closed() {
                    self.state.close();
                    debug!(app_name = %self.state.app_name(), "Install dialog dismissed");
                    let _ = sender.output(InstallDialogOutput::Closed);
                    self.finish();
                }
            }
        }

        self.refresh(widgets);
    }

    fn update_cmd_with_view(
        &mut self,
        widgets: &mut Self::Widgets,
        msg: Self::CommandOutput,
        sender: ComponentSender<Self>,
        _root: &Self::Root,
    ) {
        match msg {
            InstallDialogCmd::Loaded(event) => self.handle_loaded(event, &sender),
            InstallDialogCmd::Dispatched => self.finish(),
        }

        self.refresh(widgets);
    }

    fn shutdown(&mut self, _widgets: &mut Self::Widgets, _output: relm4::Sender<Self::Output>) {
        self.state.close();
        if let Some(picker) = self.picker.take() {
            picker.destroy();
        }
        debug!(app_name = %self.state.app_name(), "Install dialog shut down");
    }
}
