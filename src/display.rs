//! Terminal output: boxes, spinners and the progress bar. Everything here
//! only formats; decisions are made in `commands`.

use crate::commands::{DashboardInfo, Outcome};
use crate::theme::Theme;
use console::measure_text_width;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✔"];
const MAX_BOX_WIDTH: usize = 96;
const BAR_WIDTH: usize = 20;

pub struct Presenter {
    theme: Theme,
}

impl Presenter {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// A ticking spinner on stderr. Hidden automatically when stderr is not
    /// a terminal.
    pub fn spinner(&self, message: &str) -> ProgressBar {
        let template = if self.theme.spinner_color.is_empty() {
            "{spinner} {msg}".to_string()
        } else {
            format!("{{spinner:.{}}} {{msg}}", self.theme.spinner_color)
        };
        let style = ProgressStyle::default_spinner()
            .tick_strings(SPINNER_FRAMES)
            .template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.set_message(self.theme.primary.apply(message).to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    }

    pub fn progress_bar(&self, len: u64, name: &str) -> ProgressBar {
        let bar_spec = if self.theme.bar_color.is_empty() {
            format!("{{bar:{}}}", BAR_WIDTH)
        } else {
            format!("{{bar:{}.{}}}", BAR_WIDTH, self.theme.bar_color)
        };
        let template = format!(
            "{} {{percent}}% | {{pos}}/{{len}} {}",
            bar_spec,
            self.theme.primary.apply(name)
        );
        let style = ProgressStyle::default_bar()
            .template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█░");

        let bar = ProgressBar::new(len);
        bar.set_style(style);
        bar
    }

    pub fn render(&self, outcome: &Outcome) -> String {
        match outcome {
            Outcome::Dashboard(info) => self.dashboard(info),
            Outcome::Completion { title, body } => self.boxed(title, body),
            Outcome::Notice(text) => self.theme.warning.apply(text).to_string(),
        }
    }

    pub fn error(&self, message: &str) -> String {
        format!(
            "{}{}",
            self.theme.error.apply("Error: "),
            self.theme.error.apply(message)
        )
    }

    fn dashboard(&self, info: &DashboardInfo) -> String {
        let none = "None".to_string();
        let rows = [
            (&self.theme.primary, "Branch:", info.branch.clone()),
            (
                &self.theme.success,
                "Latest:",
                info.latest_message.clone().unwrap_or_else(|| "No commits yet".to_string()),
            ),
            (
                &self.theme.warning,
                "Author:",
                info.latest_author.clone().unwrap_or_else(|| none.clone()),
            ),
            (
                &self.theme.accent,
                "Changes:",
                format!("{} files modified", info.modified),
            ),
            (
                &self.theme.primary,
                "Remote:",
                info.remote.clone().unwrap_or(none),
            ),
        ];

        let body = rows
            .iter()
            .map(|(scheme, label, value)| {
                format!(
                    "{}{}",
                    self.theme.label(scheme).apply(&format!("{:<11}", label)),
                    self.theme.text.apply(value)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        self.boxed("Git Glance Dashboard", &body)
    }

    /// Draws `content` inside a double-line border with a centred title,
    /// one cell of padding and one line of margin.
    pub fn boxed(&self, title: &str, content: &str) -> String {
        let lines: Vec<String> = content
            .lines()
            .flat_map(|line| wrap(line, MAX_BOX_WIDTH))
            .collect();

        let inner = lines
            .iter()
            .map(|l| measure_text_width(l))
            .chain(std::iter::once(measure_text_width(title) + 2))
            .max()
            .unwrap_or(0)
            + 2;

        let border = |s: &str| self.theme.primary.apply(s).to_string();
        let title_text = format!(" {} ", title);
        let fill = inner.saturating_sub(measure_text_width(&title_text));
        let left = fill / 2;

        let mut out = String::from("\n");
        out.push_str(&format!(
            " {}{}{}{}\n",
            border(&format!("╔{}", "═".repeat(left))),
            self.theme.label(&self.theme.accent).apply(&title_text),
            border(&"═".repeat(fill - left)),
            border("╗")
        ));

        let blank = format!(" {}{}{}\n", border("║"), " ".repeat(inner), border("║"));
        out.push_str(&blank);
        for line in &lines {
            let pad = inner - 1 - measure_text_width(line);
            out.push_str(&format!(
                " {} {}{}{}\n",
                border("║"),
                line,
                " ".repeat(pad),
                border("║")
            ));
        }
        out.push_str(&blank);
        out.push_str(&format!(" {}\n", border(&format!("╚{}╝", "═".repeat(inner)))));
        out
    }
}

/// Greedy word wrap on display width. Words longer than `width` are kept
/// whole on their own line.
fn wrap(line: &str, width: usize) -> Vec<String> {
    if measure_text_width(line) <= width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split(' ') {
        let needed = measure_text_width(&current) + usize::from(!current.is_empty()) + measure_text_width(word);
        if !current.is_empty() && needed > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    lines.push(current);
    lines
}
