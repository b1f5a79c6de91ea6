//! Console renderer for watch events

use chrono::Local;

use crate::ui::context::UiContext;
use crate::ui::views::watch::render_watch_event;
use mcp2_toolbox::{WatchEvent, WatchEventSink};

/// Timestamped status lines; failures go to stderr
pub struct ConsoleEventSink {
    ui: UiContext,
}

impl ConsoleEventSink {
    pub fn new(ui: UiContext) -> Self {
        Self { ui }
    }
}

impl WatchEventSink for ConsoleEventSink {
    fn on_event(&self, event: WatchEvent) {
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        let Some(rendered) =
            render_watch_event(&timestamp, &event, self.ui.verbose > 0, self.ui.color, self.ui.unicode)
        else {
            return;
        };

        if event.is_failure() {
            eprint!("{rendered}");
        } else {
            print!("{rendered}");
        }
    }
}
