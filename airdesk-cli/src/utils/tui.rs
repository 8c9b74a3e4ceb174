use std::future::Future;

use indicatif::{ProgressBar, ProgressStyle};

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner().tick_strings(&["-", "\\", "|", "/"]);
    spinner.set_style(style.clone().template("{msg} {spinner}").unwrap_or(style));
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Await `work` behind a spinner on stderr, cleared once it settles.
pub async fn spin<T>(message: &str, work: impl Future<Output = T>) -> T {
    let spinner = create_spinner(message.to_string());
    let result = work.await;
    spinner.finish_and_clear();
    result
}
