use console::{measure_text_width, Style};

use crate::scoring::{ReadingEvaluation, UndertoneStrength, UserPatternTracking};

pub const TREE_BRANCH: char = '\u{251C}';
pub const TREE_END: char = '\u{2514}';
pub const TREE_HORIZ: char = '\u{2500}';
pub const TREE_VERT: char = '\u{2502}';

const TREE_PREFIX_WIDTH: usize = 4;
const VALUE_COLUMN: usize = 28;
const PREVIEW_CHARS: usize = 60;

fn tree_branch() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_BRANCH, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_end() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_END, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_indent() -> String {
    dim().apply_to(format!("{}   ", TREE_VERT)).to_string()
}

fn branch_for(i: usize, count: usize) -> String {
    if i + 1 == count {
        tree_end()
    } else {
        tree_branch()
    }
}

pub fn dim() -> Style {
    Style::new().dim()
}

fn magenta() -> Style {
    Style::new().magenta()
}

fn cyan() -> Style {
    Style::new().cyan()
}

fn green() -> Style {
    Style::new().green()
}

fn red() -> Style {
    Style::new().red()
}

fn yellow() -> Style {
    Style::new().yellow()
}

fn bold() -> Style {
    Style::new().bold()
}

fn pass_style(passed: bool) -> Style {
    if passed {
        green()
    } else {
        red()
    }
}

fn undertone_style(strength: UndertoneStrength) -> Style {
    match strength {
        UndertoneStrength::None => dim(),
        UndertoneStrength::Subtle => cyan(),
        UndertoneStrength::Moderate => yellow(),
        UndertoneStrength::Strong => magenta(),
        UndertoneStrength::Devastating => red().bold(),
    }
}

pub fn pad_label(label: &str, depth: usize) -> String {
    let prefix_width = depth * TREE_PREFIX_WIDTH;
    let target_width = VALUE_COLUMN.saturating_sub(prefix_width);
    let current_width = measure_text_width(label);
    if current_width < target_width {
        format!("{}{}", label, " ".repeat(target_width - current_width))
    } else {
        format!("{} ", label)
    }
}

pub fn format_signed(value: i64) -> String {
    let sign = if value >= 0 { "+" } else { "-" };
    format!("{}{}", dim().apply_to(sign), value.abs())
}

pub fn text_preview(text: &str) -> String {
    let preview = if text.chars().count() > PREVIEW_CHARS {
        format!("{}...", text.chars().take(PREVIEW_CHARS - 3).collect::<String>())
    } else {
        text.to_string()
    };
    preview.replace('\n', " ")
}

pub fn log_error(message: &str) {
    eprintln!("{} {}", red().bold().apply_to("[ERROR]"), message);
}

pub fn log_history_loaded(count: usize) {
    println!(
        "{} loaded {} past readings",
        cyan().apply_to("[HISTORY]"),
        bold().apply_to(count)
    );
}

/// Console tree view of one evaluated reading, with optional history context.
pub struct ReadingReport<'a> {
    pub text: &'a str,
    pub evaluation: &'a ReadingEvaluation,
    pub patterns: Option<&'a UserPatternTracking>,
}

impl ReadingReport<'_> {
    pub fn lines(&self) -> Vec<String> {
        let e = self.evaluation;
        let mut lines: Vec<String> = Vec::new();

        lines.push(format!(
            "{} \"{}\"",
            magenta().apply_to(bold().apply_to("[READING]")),
            dim().apply_to(text_preview(self.text))
        ));

        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("SPREAD")));
        lines.push(format!(
            "{}{} {}",
            tree_branch(),
            pad_label("type", 1),
            cyan().apply_to(&e.spread_type)
        ));
        lines.push(format!(
            "{}{} {}",
            tree_end(),
            pad_label("modifiers", 1),
            dim().apply_to(format!("{} validation", e.stage))
        ));

        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("SHADE LEVEL")));
        let tone = undertone_style(e.shade.undertone_strength);
        lines.push(format!(
            "{}{} {} {}",
            tree_branch(),
            pad_label(&e.shade.label(), 1),
            tone.apply_to(&e.shade.title),
            dim().apply_to(format!("({})", e.shade.undertone_strength))
        ));
        lines.push(format!(
            "{}{} {}",
            tree_branch(),
            pad_label("feedback", 1),
            dim().apply_to(&e.shade.feedback)
        ));
        lines.push(format!("{}{}", tree_end(), pad_label("components", 1)));
        let count = e.shade_breakdown.len();
        for (i, item) in e.shade_breakdown.iter().enumerate() {
            lines.push(format!(
                "    {}{} {} {}",
                branch_for(i, count),
                pad_label(&item.component.to_string(), 2),
                bold().apply_to(item.score),
                dim().apply_to(&item.feedback)
            ));
        }

        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("CORE METRICS")));
        let count = e.core_checks.len();
        for (i, check) in e.core_checks.iter().enumerate() {
            lines.push(format!(
                "{}{} {}",
                branch_for(i, count),
                pad_label(&check.metric.to_string(), 1),
                pass_style(check.passed).apply_to(format!("{}/100", check.score))
            ));
        }

        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("SCORE")));
        lines.push(format!(
            "{}{} {:.0}/{:.0}",
            tree_branch(),
            pad_label("weighted", 1),
            e.weighted.weighted,
            e.weighted.max
        ));
        lines.push(format!(
            "{}{} {:.0}/{:.0}",
            tree_branch(),
            pad_label("extended bonus", 1),
            e.extended_bonus.weighted,
            e.extended_bonus.max
        ));
        lines.push(format!("{}{}", tree_branch(), pad_label("seasonal", 1)));
        if e.seasonal.active_events.is_empty() {
            lines.push(format!(
                "{}{}{}",
                tree_indent(),
                tree_end(),
                dim().apply_to("none")
            ));
        } else {
            let count = e.seasonal.active_events.len();
            for (i, event) in e.seasonal.active_events.iter().enumerate() {
                lines.push(format!("{}{}{}", tree_indent(), branch_for(i, count), event));
            }
        }
        lines.push(format!(
            "{}{} {} {}",
            tree_branch(),
            pad_label("display score", 1),
            bold().apply_to(e.seasonal.modified_score),
            format_signed(e.seasonal.bonus_points)
        ));
        lines.push(format!(
            "{}{} {}",
            tree_end(),
            pad_label("classification", 1),
            cyan().apply_to(e.classification)
        ));

        if let Some(patterns) = self.patterns {
            lines.push(String::new());
            lines.push(format!("{}", bold().apply_to("HISTORY")));
            let context = patterns.context_lines();
            let count = context.len();
            for (i, line) in context.iter().enumerate() {
                lines.push(format!("{}{}", branch_for(i, count), dim().apply_to(line)));
            }
        }

        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("RESULT")));
        lines.push(format!("{}{}", tree_branch(), pad_label("feedback", 1)));
        if e.verdict.feedback.is_empty() {
            lines.push(format!(
                "{}{}{}",
                tree_indent(),
                tree_end(),
                dim().apply_to("none")
            ));
        } else {
            let count = e.verdict.feedback.len();
            for (i, item) in e.verdict.feedback.iter().enumerate() {
                lines.push(format!("{}{}{}", tree_indent(), branch_for(i, count), item));
            }
        }
        let (status, style) = if e.passes() {
            ("PASSED", green().bold())
        } else {
            ("FAILED", red().bold())
        };
        lines.push(format!(
            "{}{} {}",
            tree_end(),
            pad_label("status", 1),
            style.apply_to(status)
        ));

        lines
    }

    pub fn print(&self) {
        println!("{}\n", self.lines().join("\n"));
    }
}
