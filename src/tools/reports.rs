//! Scan Report Tools
//!
//! PDF export of a stored scan analysis.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::analysis::AnalysisResult;
use crate::db::Database;
use crate::models::Scan;

// ============================================================================
// Layout
// ============================================================================

const PAGE_WIDTH: f32 = 215.9; // Letter
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN: f32 = 20.0;
const FOOTER_HEIGHT: f32 = 20.0;
/// Content never goes below this line
const BOTTOM_LIMIT: f32 = FOOTER_HEIGHT + 10.0;

const COLOR_BRAND: (u8, u8, u8) = (34, 197, 94);
const COLOR_WHITE: (u8, u8, u8) = (255, 255, 255);
const COLOR_BLACK: (u8, u8, u8) = (0, 0, 0);
const COLOR_HARMFUL: (u8, u8, u8) = (220, 38, 38);
const COLOR_GRAY: (u8, u8, u8) = (102, 102, 102);
const COLOR_PANEL: (u8, u8, u8) = (248, 250, 252);
const COLOR_SUMMARY: (u8, u8, u8) = (240, 248, 255);
const COLOR_HARMFUL_PANEL: (u8, u8, u8) = (254, 242, 242);
const COLOR_ADVICE: (u8, u8, u8) = (255, 243, 205);

const SAFE_RECOMMENDATIONS: &[&str] = &[
    "This product appears to be safe for consumption.",
    "- Continue choosing products with natural ingredients",
    "- Always read ingredient labels when shopping",
];

const WARNING_RECOMMENDATIONS: &[&str] = &[
    "Consider avoiding this product due to harmful ingredients.",
    "- Look for alternative products without these harmful ingredients",
    "- Choose organic or natural alternatives when possible",
    "- Consult healthcare professionals for dietary concerns",
];

// ============================================================================
// Errors and Response Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Scan {0} has no analyzed ingredients to report")]
    NoResults(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
pub struct ExportReportResponse {
    pub success: bool,
    pub file_path: String,
    /// SAFE or WARNING
    pub status: &'static str,
    pub pages: usize,
    pub harmful_count: usize,
    pub safe_count: usize,
    pub message: String,
}

// ============================================================================
// PDF Generation Helper Functions
// ============================================================================

fn rgb_to_printpdf(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

fn add_text(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    x: f32,
    y: f32,
    size: f32,
    color: (u8, u8, u8),
) {
    layer.set_fill_color(rgb_to_printpdf(color.0, color.1, color.2));
    layer.use_text(text, size, Mm(x), Mm(y), font);
}

/// Filled rectangle from (x, y) bottom-left
fn fill_rect(layer: &PdfLayerReference, x: f32, y: f32, width: f32, height: f32, color: (u8, u8, u8)) {
    layer.set_fill_color(rgb_to_printpdf(color.0, color.1, color.2));

    let polygon = Polygon {
        rings: vec![vec![
            (Point::new(Mm(x), Mm(y)), false),
            (Point::new(Mm(x + width), Mm(y)), false),
            (Point::new(Mm(x + width), Mm(y + height)), false),
            (Point::new(Mm(x), Mm(y + height)), false),
        ]],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    };
    layer.add_polygon(polygon);
}

/// Approximate Helvetica line capacity for a width in mm
fn chars_per_line(width: f32, font_size: f32) -> usize {
    // average glyph is about half an em; 1pt = 0.3528mm
    let glyph_mm = font_size * 0.5 * 0.3528;
    ((width / glyph_mm) as usize).max(1)
}

/// Greedy word wrap. Words longer than a line are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(max_chars).collect();
            word = word.chars().skip(max_chars).collect();
            lines.push(head);
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Tracks the current page and vertical position; y grows upward
struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layers: Vec<PdfLayerReference>,
    y: f32,
}

impl<'a> PageCursor<'a> {
    fn new(doc: &'a PdfDocumentReference, first: PdfLayerReference) -> Self {
        Self {
            doc,
            layers: vec![first],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn layer(&self) -> &PdfLayerReference {
        // never empty: created with the first page
        &self.layers[self.layers.len() - 1]
    }

    /// Start a new page when less than `needed` mm remain
    fn ensure_space(&mut self, needed: f32) {
        if self.y - needed < BOTTOM_LIMIT {
            let page_number = self.layers.len() + 1;
            let (page, layer) = self.doc.add_page(
                Mm(PAGE_WIDTH),
                Mm(PAGE_HEIGHT),
                format!("Page {}", page_number),
            );
            self.layers.push(self.doc.get_page(page).get_layer(layer));
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn text(&mut self, font: &IndirectFontRef, text: &str, x: f32, size: f32, color: (u8, u8, u8), advance: f32) {
        self.ensure_space(advance);
        add_text(self.layer(), font, text, x, self.y, size, color);
        self.y -= advance;
    }

    /// Wrapped paragraph, breaking pages between lines
    fn paragraph(&mut self, font: &IndirectFontRef, text: &str, x: f32, size: f32, line_height: f32) {
        let max_chars = chars_per_line(PAGE_WIDTH - x - MARGIN, size);
        for line in wrap_text(text, max_chars) {
            self.text(font, &line, x, size, COLOR_BLACK, line_height);
        }
    }
}

// ============================================================================
// Scan Report Generation
// ============================================================================

/// SAFE when no harmful ingredient was found, otherwise WARNING
pub fn report_status(scan: &Scan) -> &'static str {
    if scan.harmful_count() == 0 {
        "SAFE"
    } else {
        "WARNING"
    }
}

/// `NutriScan-Analysis-<SAFE|WARNING>-<millis>.pdf`
pub fn report_file_name(scan: &Scan) -> String {
    let millis = scan
        .id_millis()
        .map(str::to_string)
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis().to_string());
    format!("NutriScan-Analysis-{}-{}.pdf", report_status(scan), millis)
}

/// Render a scan analysis to a Letter-size PDF. Returns the page count.
pub fn generate_scan_report(scan: &Scan, output_path: &Path) -> Result<usize, ReportError> {
    if scan.found_nothing() {
        return Err(ReportError::NoResults(scan.id.clone()));
    }

    let harmful: Vec<&AnalysisResult> = scan.results.iter().filter(|r| r.is_harmful()).collect();
    let safe: Vec<&AnalysisResult> = scan.results.iter().filter(|r| !r.is_harmful()).collect();

    let (doc, page1, layer1) = PdfDocument::new(
        "NutriScan Ingredient Analysis Report",
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Page 1",
    );

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;

    let mut cursor = PageCursor::new(&doc, doc.get_page(page1).get_layer(layer1));
    let content_width = PAGE_WIDTH - 2.0 * MARGIN;

    // Header band
    fill_rect(cursor.layer(), 0.0, PAGE_HEIGHT - 35.0, PAGE_WIDTH, 35.0, COLOR_BRAND);
    add_text(cursor.layer(), &font_bold, "NUTRISCAN - INGREDIENT ANALYSIS REPORT", MARGIN, PAGE_HEIGHT - 20.0, 16.0, COLOR_WHITE);
    add_text(cursor.layer(), &font, "Smart Ingredient Scanner", PAGE_WIDTH - 60.0, PAGE_HEIGHT - 28.0, 9.0, COLOR_WHITE);
    cursor.y = PAGE_HEIGHT - 50.0;

    // Scan information
    fill_rect(cursor.layer(), MARGIN, cursor.y - 20.0, content_width, 25.0, COLOR_PANEL);
    cursor.text(&font_bold, "SCAN INFORMATION", MARGIN + 5.0, 10.0, COLOR_BLACK, 6.0);
    add_text(cursor.layer(), &font, &format!("Date: {}", scan.created_at.get(..10).unwrap_or(&scan.created_at)), MARGIN + 90.0, cursor.y, 9.0, COLOR_BLACK);
    cursor.text(&font, &format!("Scan ID: {}", scan.id), MARGIN + 5.0, 9.0, COLOR_BLACK, 5.0);
    add_text(cursor.layer(), &font, &format!("Total Ingredients: {}", scan.results.len()), MARGIN + 90.0, cursor.y, 9.0, COLOR_BLACK);
    let product = scan.product_name.as_deref().unwrap_or("Unknown Product");
    cursor.text(&font, &format!("Product: {}", product), MARGIN + 5.0, 9.0, COLOR_BLACK, 5.0);
    add_text(cursor.layer(), &font, &format!("Source: {}", scan.source.as_str()), MARGIN + 90.0, cursor.y, 9.0, COLOR_BLACK);
    cursor.text(&font, &format!("Language: {}", scan.language), MARGIN + 5.0, 9.0, COLOR_BLACK, 14.0);

    // Extracted text
    cursor.text(&font_bold, "EXTRACTED INGREDIENTS:", MARGIN, 13.0, COLOR_BLACK, 8.0);
    cursor.paragraph(&font, &scan.extracted_text, MARGIN, 9.0, 4.5);
    cursor.y -= 8.0;

    // Summary
    cursor.ensure_space(45.0);
    fill_rect(cursor.layer(), MARGIN, cursor.y - 38.0, content_width, 44.0, COLOR_SUMMARY);
    cursor.text(&font_bold, "ANALYSIS SUMMARY", MARGIN + 5.0, 12.0, COLOR_BLACK, 7.0);
    cursor.text(&font, &format!("Total Ingredients Analyzed: {}", scan.results.len()), MARGIN + 5.0, 10.0, COLOR_BLACK, 5.0);
    cursor.text(&font, &format!("Harmful Ingredients Found: {}", harmful.len()), MARGIN + 5.0, 10.0, COLOR_HARMFUL, 5.0);
    cursor.text(&font, &format!("Safe Ingredients: {}", safe.len()), MARGIN + 5.0, 10.0, COLOR_BRAND, 5.0);
    if let Some(ref score) = scan.score {
        cursor.text(
            &font_bold,
            &format!("Nutrition Score: {}/100 (Grade {}) - {}", score.overall, score.grade(), score.description),
            MARGIN + 5.0,
            10.0,
            COLOR_BLACK,
            5.0,
        );
    }
    cursor.text(
        &font,
        &format!("Risk Level: {} ({}/10) - {}", scan.risk.level.as_str(), scan.risk.score, scan.risk.description),
        MARGIN + 5.0,
        10.0,
        COLOR_BLACK,
        14.0,
    );

    for alert in &scan.alerts {
        cursor.text(&font_bold, alert, MARGIN, 9.0, COLOR_HARMFUL, 5.0);
    }
    if !scan.alerts.is_empty() {
        cursor.y -= 5.0;
    }

    // Harmful ingredients
    if !harmful.is_empty() {
        cursor.text(&font_bold, "HARMFUL INGREDIENTS DETECTED:", MARGIN, 13.0, COLOR_HARMFUL, 10.0);

        for (index, result) in harmful.iter().enumerate() {
            let reason = format!("Reason: {}", result.reason().unwrap_or("Not specified"));
            let reason_lines = wrap_text(&reason, chars_per_line(content_width - 10.0, 8.0));
            let block_height = 12.0 + reason_lines.len() as f32 * 3.8;

            cursor.ensure_space(block_height + 4.0);
            fill_rect(cursor.layer(), MARGIN, cursor.y - block_height + 5.0, content_width, block_height + 1.0, COLOR_HARMFUL_PANEL);

            cursor.text(
                &font_bold,
                &format!("{}. {}", index + 1, result.ingredient().to_uppercase()),
                MARGIN + 5.0,
                11.0,
                COLOR_HARMFUL,
                5.0,
            );
            let severity = result.severity().map(|s| s.as_str().to_uppercase()).unwrap_or_else(|| "UNKNOWN".to_string());
            let category = result.category().map(|c| c.as_str()).unwrap_or("Unknown");
            add_text(cursor.layer(), &font, &format!("Category: {}", category), MARGIN + 80.0, cursor.y, 9.0, COLOR_BLACK);
            cursor.text(&font, &format!("Risk Level: {}", severity), MARGIN + 5.0, 9.0, COLOR_BLACK, 4.5);
            for line in &reason_lines {
                cursor.text(&font, line, MARGIN + 5.0, 8.0, COLOR_BLACK, 3.8);
            }
            cursor.y -= 6.0;
        }
        cursor.y -= 4.0;
    }

    // Safe ingredients
    if !safe.is_empty() {
        cursor.text(&font_bold, "SAFE INGREDIENTS:", MARGIN, 13.0, COLOR_BRAND, 8.0);
        for (index, result) in safe.iter().enumerate() {
            cursor.text(
                &font,
                &format!("{}. {} - SAFE", index + 1, result.ingredient()),
                MARGIN + 5.0,
                9.0,
                COLOR_BLACK,
                4.5,
            );
        }
        cursor.y -= 8.0;
    }

    // Recommendations
    let advice = if harmful.is_empty() {
        SAFE_RECOMMENDATIONS
    } else {
        WARNING_RECOMMENDATIONS
    };
    cursor.ensure_space(10.0 + advice.len() as f32 * 4.5);
    fill_rect(cursor.layer(), MARGIN, cursor.y + 5.0, content_width, 2.0, COLOR_ADVICE);
    cursor.text(&font_bold, "RECOMMENDATIONS:", MARGIN, 12.0, COLOR_BLACK, 8.0);
    for line in advice {
        cursor.text(&font, line, MARGIN + 5.0, 9.0, COLOR_BLACK, 4.5);
    }
    if let Some(ref score) = scan.score {
        for line in &score.recommendations {
            cursor.text(&font, &format!("- {}", line), MARGIN + 5.0, 9.0, COLOR_BLACK, 4.5);
        }
    }

    // Footer on every page
    let page_count = cursor.layers.len();
    let report_date = chrono::Local::now().format("%Y-%m-%d").to_string();
    for (i, layer) in cursor.layers.iter().enumerate() {
        fill_rect(layer, 0.0, 0.0, PAGE_WIDTH, FOOTER_HEIGHT, COLOR_PANEL);
        add_text(layer, &font, "Generated by NutriScan - Ingredient Analysis", MARGIN, 12.0, 7.0, COLOR_GRAY);
        add_text(layer, &font, &format!("Page {} of {}", i + 1, page_count), PAGE_WIDTH - 40.0, 12.0, 7.0, COLOR_GRAY);
        add_text(layer, &font, &format!("Report Date: {}", report_date), MARGIN, 6.0, 7.0, COLOR_GRAY);
    }

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer).map_err(|e| ReportError::Pdf(e.to_string()))?;

    Ok(page_count)
}

/// Export a stored scan as PDF, into `report_dir` unless a path is given
pub fn export_scan_report(
    db: &Database,
    scan_id: &str,
    report_dir: &Path,
    output_path: Option<&str>,
) -> Result<ExportReportResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let scan = Scan::get_by_id(&conn, scan_id)
        .map_err(|e| format!("Failed to get scan: {}", e))?
        .ok_or_else(|| format!("Scan not found: {}", scan_id))?;

    let path = output_path
        .map(PathBuf::from)
        .unwrap_or_else(|| report_dir.join(report_file_name(&scan)));

    let pages = generate_scan_report(&scan, &path).map_err(|e| e.to_string())?;
    let status = report_status(&scan);
    let harmful_count = scan.harmful_count();
    let safe_count = scan.safe_count();

    info!(scan_id, path = %path.display(), pages, "Scan report written");

    let message = if harmful_count == 0 {
        format!("Analysis report saved. {} safe ingredients found.", safe_count)
    } else {
        format!(
            "Analysis report saved. Found {} harmful and {} safe ingredients.",
            harmful_count, safe_count
        )
    };

    Ok(ExportReportResponse {
        success: true,
        file_path: path.display().to_string(),
        status,
        pages,
        harmful_count,
        safe_count,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::HazardTable;
    use crate::intake::ScanSource;
    use crate::db::migrations::run_migrations;
    use crate::tools::dashboard::get_dashboard;
    use crate::tools::profile::sign_in;
    use crate::tools::scanner::{analyze_ingredients, build_scan, ScanContext, ScanOptions};
    use chrono::{TimeZone, Utc};

    fn scan_of(text: &str) -> Scan {
        let at = Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
        build_scan(&HazardTable::builtin(), ScanSource::Text, text, &ScanOptions::default(), at).unwrap()
    }

    fn temp_pdf(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("nutriscan-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("", 10), Vec::<String>::new());
        assert_eq!(wrap_text("water, sugar, salt", 12), vec!["water,", "sugar, salt"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_file_name_status() {
        let safe = scan_of("Water, Salt");
        let name = report_file_name(&safe);
        assert!(name.starts_with("NutriScan-Analysis-SAFE-"));
        assert!(name.ends_with(&format!("{}.pdf", safe.id_millis().unwrap())));

        let warning = scan_of("Water, BHT");
        assert!(report_file_name(&warning).starts_with("NutriScan-Analysis-WARNING-"));
    }

    #[test]
    fn test_generate_report_writes_pdf() {
        let scan = scan_of("Water, High Fructose Corn Syrup, Salt");
        let path = temp_pdf("single.pdf");

        let pages = generate_scan_report(&scan, &path).unwrap();
        assert_eq!(pages, 1);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_long_report_breaks_pages() {
        let text = (0..60)
            .map(|i| if i % 2 == 0 { "BHA".to_string() } else { format!("Ingredient {}", i) })
            .collect::<Vec<_>>()
            .join(", ");
        let scan = scan_of(&text);
        let path = temp_pdf("multi.pdf");

        let pages = generate_scan_report(&scan, &path).unwrap();
        assert!(pages > 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_export_stored_scan_and_dashboard() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        let hazards = HazardTable::builtin();
        let ctx = ScanContext {
            database: &db,
            hazards: &hazards,
            history_limit: 50,
        };

        let user = sign_in(&db).unwrap();
        let options = ScanOptions {
            user_id: Some(user.id.clone()),
            ..Default::default()
        };
        let stored = analyze_ingredients(&ctx, "Water, BHT, Salt", &options).unwrap();
        assert!(stored.stored);
        let scan_id = stored.scan.id.clone();

        let dir = std::env::temp_dir().join(format!("nutriscan-export-{}", std::process::id()));
        let response = export_scan_report(&db, &scan_id, &dir, None).unwrap();
        let expected = format!("NutriScan-Analysis-WARNING-{}.pdf", stored.scan.id_millis().unwrap());
        assert!(response.file_path.ends_with(&expected));
        assert_eq!(response.status, "WARNING");
        assert_eq!(response.pages, 1);
        assert_eq!(response.harmful_count, 1);
        assert!(std::fs::read(&response.file_path).unwrap().starts_with(b"%PDF"));
        let _ = std::fs::remove_dir_all(&dir);

        assert!(export_scan_report(&db, "scan_0_missing", &dir, None).is_err());

        let dashboard = get_dashboard(&db, &user.id, 50).unwrap();
        let analytics = dashboard.analytics.unwrap();
        assert_eq!(analytics.total_scans, 1);
        assert_eq!(analytics.harmful_ingredients_count, 1);
        assert_eq!(dashboard.recent_scans.len(), 1);
        assert_eq!(dashboard.recent_scans[0].id, scan_id);

        assert!(get_dashboard(&db, "user_0", 50).unwrap().analytics.is_none());
    }

    #[test]
    fn test_empty_scan_is_rejected() {
        let scan = scan_of("");
        let err = generate_scan_report(&scan, &temp_pdf("empty.pdf")).unwrap_err();
        assert!(matches!(err, ReportError::NoResults(_)));
    }
}
