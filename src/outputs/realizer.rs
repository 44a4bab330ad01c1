use crate::config::Card;
use crate::kernel::segment::{Segment, SegmentKind};

/// PURE FUNCTION: Fixed-width text progress bar for `fraction` in `0.0..=1.0`.
pub fn progress_bar(fraction: f32, width: usize) -> String {
    let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
    let filled = ((fraction * width as f32).round() as usize).min(width);
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        (fraction * 100.0).round() as u32
    )
}

/// PURE FUNCTION: Text lines for one segment as the console shows it.
pub fn segment_lines(segment: &Segment, position: usize, total: usize) -> Vec<String> {
    let header = format!("({}/{})", position + 1, total);
    match segment.kind() {
        SegmentKind::QuestionAndSubtitle | SegmentKind::MultiQuestionCycle { .. } => vec![
            format!("{} {}", header, segment.primary_text()),
            format!("      {}", segment.secondary_text()),
        ],
        // Previous question stays on screen in the page; the console just marks the dim.
        SegmentKind::SubtitleOnly => vec![format!("{} ... {}", header, segment.secondary_text())],
    }
}

pub fn card_lines(card: &Card) -> Vec<String> {
    vec![format!("== {} ==", card.title), card.body.clone()]
}
