pub mod install_dialog;
