use crate::ui::blocks::header::CommandHeader;
use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;
use mcp2_toolbox::{WatchConfig, WatchEvent};

/// Changed paths listed individually before collapsing into a count
const MAX_LISTED_PATHS: usize = 3;

pub fn render_watch_header(
    title: &str,
    config: &WatchConfig,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut header = CommandHeader::new(Icon::Watch, title);
    header
        .add("Project", config.project_root.display().to_string())
        .add("Artifact", config.artifact.display().to_string())
        .add("Build", config.build_command.as_str())
        .add("Target", config.target.display_name());
    if let Some(host) = &config.host {
        header.add("Host", host.as_str());
    }
    header.add("Hint", "Press Ctrl+C to stop");
    header.render(supports_color, supports_unicode)
}

/// One console line (plus optional output tail) per event.
///
/// State transitions are only rendered when `verbose` is set; returns
/// `None` for events that produce no output.
pub fn render_watch_event(
    timestamp: &str,
    event: &WatchEvent,
    verbose: bool,
    supports_color: bool,
    supports_unicode: bool,
) -> Option<String> {
    let prefix = ColoredText::dim(format!("[{}]", timestamp)).render(supports_color);
    let icon = |icon: Icon| icon.colored(supports_color, supports_unicode);

    let line = match event {
        WatchEvent::WatchStarted { project, .. } => {
            format!("{} {} Watching {}\n", prefix, icon(Icon::Watch), project)
        }
        WatchEvent::ChangesDetected { paths } => {
            format!("{} {} Changed: {}\n", prefix, icon(Icon::Arrow), summarize(paths))
        }
        WatchEvent::StateChanged { from, to } => {
            if !verbose {
                return None;
            }
            format!("{} {} {} -> {}\n", prefix, icon(Icon::Pending), from, to)
        }
        WatchEvent::BuildQueued { paths } => format!(
            "{} {} Build running, queued {} change(s)\n",
            prefix,
            icon(Icon::Pending),
            paths.len()
        ),
        WatchEvent::BuildStarted { cycle, command } => format!(
            "{} {} Build #{}: {}\n",
            prefix,
            icon(Icon::Build),
            cycle,
            command
        ),
        WatchEvent::BuildSucceeded { cycle, duration_ms } => format!(
            "{} {} Build #{} succeeded in {}\n",
            prefix,
            icon(Icon::Success),
            cycle,
            format_duration(*duration_ms)
        ),
        WatchEvent::BuildFailed {
            cycle,
            reason,
            output_tail,
            ..
        } => {
            let mut out = format!(
                "{} {} Build #{} failed: {}\n",
                prefix,
                icon(Icon::Error),
                cycle,
                ColoredText::error(reason.as_str()).render(supports_color)
            );
            out.push_str(&render_tail(output_tail, supports_color));
            out
        }
        WatchEvent::DeployStarted { target, artifact, .. } => format!(
            "{} {} Deploying {} to {}\n",
            prefix,
            icon(Icon::Deploy),
            artifact,
            target
        ),
        WatchEvent::DeployFinished { detail, .. } => {
            format!("{} {} {}\n", prefix, icon(Icon::Success), detail)
        }
        WatchEvent::DeployFailed { error, .. } => format!(
            "{} {} Deploy failed: {}\n",
            prefix,
            icon(Icon::Error),
            ColoredText::error(error.as_str()).render(supports_color)
        ),
        WatchEvent::Error { message } => {
            format!("{} {} Error: {}\n", prefix, icon(Icon::Error), message)
        }
        WatchEvent::Shutdown => format!("\n{} {} Watch stopped.\n", prefix, icon(Icon::Watch)),
    };
    Some(line)
}

fn summarize(paths: &[String]) -> String {
    if paths.len() <= MAX_LISTED_PATHS {
        return paths.join(", ");
    }
    format!(
        "{} (+{} more)",
        paths[..MAX_LISTED_PATHS].join(", "),
        paths.len() - MAX_LISTED_PATHS
    )
}

fn render_tail(lines: &[String], supports_color: bool) -> String {
    lines
        .iter()
        .map(|l| format!("    {}\n", ColoredText::dim(l.as_str()).render(supports_color)))
        .collect()
}

fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else {
        format!("{:.1}s", ms as f64 / 1000.0)
    }
}
