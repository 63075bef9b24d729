//! Recommendation digest: the three content lists and their text rendering.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::value::{MessageBody, truncate_chars};

/// Split mode starts a new part once a part would grow past this many characters.
pub const SPLIT_PART_CHARS: usize = 3800;

/// Rationales and explanations are cut to this many characters before `...`.
const BLURB_CHARS: usize = 100;

/// At most this many sample books are listed per series.
const SAMPLE_BOOKS: usize = 2;

const TOP_PICKS_HEADING: &str = "⭐ TOP PICKS FOR YOU ⭐\n";
const SERIES_HEADING: &str = "📖 RECOMMENDED SERIES & AUTHORS 📖\n";
const PLAN_HEADING: &str = "📅 READING PLAN 📅\n";
const EMPTY_MONTH: &str = "More recommendations coming soon!\n";
const FOOTER: &str = "\n📚 Happy Reading! 📚";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookPick {
    pub title: Option<String>,
    pub author: Option<String>,
    pub series: Option<String>,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
/// Confidence score as sent by the recommender: a number or a string.
pub enum Score {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesRecommendation {
    pub series_name: Option<String>,
    pub name: Option<String>,
    pub author_name: Option<String>,
    pub confidence_score: Option<Score>,
    pub rationale: Option<String>,
    pub sample_books: Vec<BookPick>,
    pub justbookify_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthPlan {
    pub month: Option<String>,
    pub books: Vec<BookPick>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// Everything that goes into one recommendation message.
pub struct RecommendationDigest {
    pub name: String,
    #[serde(default)]
    pub recommendations: Vec<SeriesRecommendation>,
    #[serde(default)]
    pub current: Vec<BookPick>,
    #[serde(default)]
    pub future: Vec<MonthPlan>,
}

impl RecommendationDigest {
    pub fn new(
        name: impl Into<String>,
        recommendations: Vec<SeriesRecommendation>,
        current: Vec<BookPick>,
        future: Vec<MonthPlan>,
    ) -> Self {
        Self {
            name: name.into(),
            recommendations,
            current,
            future,
        }
    }

    /// Render the whole digest as one text body.
    ///
    /// All three section headings are always present. The result is not
    /// length-limited; wrap it in [`MessageBody`] to apply the provider limit.
    pub fn render(&self) -> String {
        let mut out = self.header();

        out.push_str(TOP_PICKS_HEADING);
        for book in &self.current {
            out.push_str(&pick_entry(book));
        }
        out.push('\n');

        out.push_str(SERIES_HEADING);
        for rec in &self.recommendations {
            out.push_str(&series_entry(rec));
        }
        out.push('\n');

        out.push_str(PLAN_HEADING);
        for month in &self.future {
            out.push_str(&format!("{}\n", month_label(month)));
            out.push_str(&month_lines(month));
        }

        out.push_str(FOOTER);
        out
    }

    /// Render the digest as several bodies for back-to-back delivery.
    ///
    /// Parts are packed below [`SPLIT_PART_CHARS`] and each one repeats the
    /// greeting header. Every month of the reading plan gets its own part and
    /// the footer closes the last part. Parts are cut at [`MessageBody::MAX_CHARS`],
    /// the last one before the footer is appended so the footer always survives.
    pub fn render_parts(&self) -> Vec<String> {
        let mut packer = Packer::new(self.header());

        packer.section(TOP_PICKS_HEADING, self.current.iter().map(pick_entry));
        packer.section(SERIES_HEADING, self.recommendations.iter().map(series_entry));

        for month in &self.future {
            packer.standalone(format!(
                "📅 {} READING PLAN 📅\n{}",
                month_label(month),
                month_lines(month)
            ));
        }

        packer.finish()
    }

    fn header(&self) -> String {
        let name = self.name.trim();
        let name = if name.is_empty() { "Reader" } else { name };
        format!("📚 Book Recommendations for {name} 📚\n\n")
    }
}

struct Packer {
    header: String,
    parts: Vec<String>,
    buf: String,
}

impl Packer {
    fn new(header: String) -> Self {
        Self {
            buf: header.clone(),
            header,
            parts: Vec::new(),
        }
    }

    fn has_content(&self) -> bool {
        self.buf.len() > self.header.len()
    }

    fn flush(&mut self) {
        let part = std::mem::replace(&mut self.buf, self.header.clone());
        self.parts.push(part);
    }

    fn section(&mut self, heading: &str, entries: impl Iterator<Item = String>) {
        let mut started = false;
        for entry in entries {
            let addition = if started {
                entry
            } else {
                format!("{heading}{entry}")
            };
            let projected = self.buf.chars().count() + addition.chars().count();
            if self.has_content() && projected > SPLIT_PART_CHARS {
                self.flush();
                if started {
                    self.buf.push_str(heading);
                }
            }
            self.buf.push_str(&addition);
            started = true;
        }
        if started {
            self.buf.push('\n');
        }
    }

    fn standalone(&mut self, body: String) {
        if self.has_content() {
            self.flush();
        }
        self.parts.push(format!("{}{body}", self.header));
    }

    /// Cut every part to the provider limit; the last one keeps room for the footer.
    fn finish(mut self) -> Vec<String> {
        if self.has_content() || self.parts.is_empty() {
            self.flush();
        }
        let last = self.parts.len() - 1;
        let footer_chars = FOOTER.chars().count();
        self.parts
            .into_iter()
            .enumerate()
            .map(|(idx, part)| {
                if idx == last {
                    let mut part = truncate_chars(part, MessageBody::MAX_CHARS - footer_chars);
                    part.push_str(FOOTER);
                    part
                } else {
                    truncate_chars(part, MessageBody::MAX_CHARS)
                }
            })
            .collect()
    }
}

fn blurb(text: &str) -> String {
    format!("{}...", truncate_chars(text.to_owned(), BLURB_CHARS))
}

fn book_line(book: &BookPick, with_series: bool) -> String {
    let title = book.title.as_deref().unwrap_or("Untitled");
    let author = book.author.as_deref().unwrap_or("Unknown Author");
    match book.series.as_deref().filter(|s| with_series && !s.is_empty()) {
        Some(series) => format!("• {title} ({series} Series) by {author}\n"),
        None => format!("• {title} by {author}\n"),
    }
}

fn pick_entry(book: &BookPick) -> String {
    let mut entry = book_line(book, true);
    if let Some(explanation) = book.explanation.as_deref().filter(|e| !e.is_empty()) {
        entry.push_str(&format!("  Why: {}\n", blurb(explanation)));
    }
    entry.push('\n');
    entry
}

fn series_entry(rec: &SeriesRecommendation) -> String {
    let title = rec
        .series_name
        .as_deref()
        .or(rec.name.as_deref())
        .unwrap_or("Unknown Series");
    let author = rec.author_name.as_deref().unwrap_or("Unknown Author");
    let score = rec
        .confidence_score
        .as_ref()
        .map_or_else(|| "N/A".to_owned(), Score::to_string);

    let mut entry = format!("\n{title} by {author} (Score: {score}/10)\n");
    if let Some(rationale) = rec.rationale.as_deref().filter(|r| !r.is_empty()) {
        entry.push_str(&format!("Why: {}\n", blurb(rationale)));
    }
    if !rec.sample_books.is_empty() {
        entry.push_str("Featured Books:\n");
        for book in rec.sample_books.iter().take(SAMPLE_BOOKS) {
            entry.push_str(&book_line(book, false));
        }
    }
    if let Some(link) = rec.justbookify_link.as_deref() {
        entry.push_str(&format!("🔍 View More: {link}\n"));
    }
    entry
}

fn month_label(month: &MonthPlan) -> String {
    month
        .month
        .as_deref()
        .unwrap_or("Upcoming")
        .to_uppercase()
}

fn month_lines(month: &MonthPlan) -> String {
    if month.books.is_empty() {
        return EMPTY_MONTH.to_owned();
    }
    month.books.iter().map(|book| book_line(book, true)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, author: &str) -> BookPick {
        BookPick {
            title: Some(title.to_owned()),
            author: Some(author.to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn empty_digest_renders_name_and_empty_sections() {
        let digest = RecommendationDigest::new("Test Child", vec![], vec![], vec![]);
        let body = digest.render();

        assert!(body.starts_with("📚 Book Recommendations for Test Child 📚\n"));
        assert!(body.contains(TOP_PICKS_HEADING));
        assert!(body.contains(SERIES_HEADING));
        assert!(body.contains(PLAN_HEADING));
        assert!(body.ends_with("📚 Happy Reading! 📚"));
        assert!(body.chars().count() <= MessageBody::MAX_CHARS);
    }

    #[test]
    fn blank_name_falls_back_to_reader() {
        let digest = RecommendationDigest::new("  ", vec![], vec![], vec![]);
        assert!(digest.render().contains("for Reader 📚"));
    }

    #[test]
    fn picks_include_series_and_short_explanation() {
        let pick = BookPick {
            series: Some("Wings of Fire".to_owned()),
            explanation: Some("x".repeat(150)),
            ..book("The Dragonet Prophecy", "Tui T. Sutherland")
        };
        let digest = RecommendationDigest::new("Ada", vec![], vec![pick], vec![]);
        let body = digest.render();

        assert!(body.contains(
            "• The Dragonet Prophecy (Wings of Fire Series) by Tui T. Sutherland\n"
        ));
        assert!(body.contains(&format!("  Why: {}...\n", "x".repeat(100))));
    }

    #[test]
    fn series_entries_cap_sample_books_and_default_missing_fields() {
        let rec = SeriesRecommendation {
            name: Some("Narnia".to_owned()),
            confidence_score: Some(Score::Number(serde_json::Number::from(9))),
            sample_books: vec![book("A", "Lewis"), book("B", "Lewis"), book("C", "Lewis")],
            justbookify_link: Some("https://example.invalid/narnia".to_owned()),
            ..Default::default()
        };
        let digest = RecommendationDigest::new("Ada", vec![rec], vec![], vec![]);
        let body = digest.render();

        assert!(body.contains("Narnia by Unknown Author (Score: 9/10)\n"));
        assert!(body.contains("• B by Lewis\n"));
        assert!(!body.contains("• C by Lewis\n"));
        assert!(body.contains("🔍 View More: https://example.invalid/narnia\n"));
    }

    #[test]
    fn months_without_books_get_placeholder() {
        let plan = MonthPlan {
            month: Some("January".to_owned()),
            books: vec![],
        };
        let digest = RecommendationDigest::new("Ada", vec![], vec![], vec![plan]);
        assert!(digest.render().contains("JANUARY\nMore recommendations coming soon!\n"));
    }

    #[test]
    fn digest_decodes_loose_json() {
        let json = r#"{
            "name": "Ada",
            "recommendations": [{"series_name": "Warriors", "confidence_score": "8.5", "extra": 1}],
            "current": [{"title": "Holes"}],
            "future": [{"month": "march", "books": [{"title": "Matilda", "author": "Dahl"}]}]
        }"#;
        let digest: RecommendationDigest = serde_json::from_str(json).unwrap();
        let body = digest.render();

        assert!(body.contains("Warriors by Unknown Author (Score: 8.5/10)"));
        assert!(body.contains("• Holes by Unknown Author\n"));
        assert!(body.contains("MARCH\n• Matilda by Dahl\n"));
    }

    #[test]
    fn split_parts_stay_under_limit_and_repeat_header() {
        let picks = (0..80)
            .map(|idx| BookPick {
                explanation: Some("because ".repeat(20)),
                ..book(&format!("Book {idx}"), "Someone")
            })
            .collect::<Vec<_>>();
        let future = vec![
            MonthPlan {
                month: Some("April".to_owned()),
                books: vec![book("Matilda", "Dahl")],
            },
            MonthPlan {
                month: Some("May".to_owned()),
                books: vec![],
            },
        ];
        let digest = RecommendationDigest::new("Ada", vec![], picks, future);
        let parts = digest.render_parts();

        assert!(parts.len() >= 4);
        for part in &parts {
            assert!(part.starts_with("📚 Book Recommendations for Ada 📚\n"));
            assert!(part.chars().count() <= SPLIT_PART_CHARS + FOOTER.chars().count());
        }
        assert!(parts[1].contains(TOP_PICKS_HEADING));
        let last = parts.last().unwrap();
        assert!(last.contains("📅 MAY READING PLAN 📅\nMore recommendations coming soon!\n"));
        assert!(last.ends_with("📚 Happy Reading! 📚"));
        assert_eq!(parts.iter().filter(|p| p.contains("Happy Reading")).count(), 1);
    }

    #[test]
    fn split_keeps_footer_when_last_part_is_oversized() {
        let picks = (0..2)
            .map(|idx| book(&format!("{idx}{}", "t".repeat(5000)), "Someone"))
            .collect();
        let digest = RecommendationDigest::new("Ada", vec![], picks, vec![]);
        let parts = digest.render_parts();

        assert_eq!(parts.len(), 2);
        for part in &parts {
            assert_eq!(part.chars().count(), MessageBody::MAX_CHARS);
        }
        assert!(!parts[0].ends_with(FOOTER));
        assert!(parts[1].ends_with(FOOTER));
    }

    #[test]
    fn split_of_empty_digest_is_one_part() {
        let digest = RecommendationDigest::new("Ada", vec![], vec![], vec![]);
        let parts = digest.render_parts();
        assert_eq!(parts.len(), 1);
        assert!(parts[0].ends_with("📚 Happy Reading! 📚"));
    }
}
