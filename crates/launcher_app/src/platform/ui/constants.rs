pub const TITLE: &str = "Script Launcher";
pub const CLIENT_PANEL_LABEL: &str = "Client Settings";
pub const RESULTS_LABEL: &str = "Results";
pub const PROGRESS_BAR_WIDTH: usize = 20;
