//! Minimal PDF 1.4 writer for the sales report.
//!
//! Pages are A4 portrait. Text uses the standard Helvetica fonts with
//! WinAnsiEncoding, so French accents render without embedding a font.
//! Layout coordinates are in millimetres from the top-left corner and are
//! converted to PDF points when written.

use super::{date_fr, local_date_fr, shift_label};
use crate::{
    models::{fuel_transaction::Shift, ExpenseCategory},
    services::reports::SalesReport,
};
use chrono::{DateTime, FixedOffset, Utc};
use std::collections::BTreeMap;
use std::fmt::Write as _;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 14.0;
const BOTTOM_LIMIT_MM: f32 = 282.0;
const PT_PER_MM: f32 = 72.0 / 25.4;

const ROW_HEIGHT_MM: f32 = 7.0;
const CELL_PADDING_MM: f32 = 1.8;
const TABLE_FONT_SIZE: f32 = 9.0;

const HEADER_FILL: (u8, u8, u8) = (66, 139, 202);
const STRIPE_FILL: (u8, u8, u8) = (245, 245, 245);

#[derive(Debug, Clone)]
pub struct PdfOptions {
    pub offset: FixedOffset,
    pub currency: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// Encodes text as a PDF literal string in WinAnsiEncoding.
fn pdf_string(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(b'(');
    for ch in text.chars() {
        let byte = match ch {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                ch as u8
            }
            '\n' | '\r' | '\t' => b' ',
            c if (c as u32) < 0x80 => c as u8,
            c if (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
            '€' => 0x80,
            '’' => b'\'',
            _ => b'?',
        };
        out.push(byte);
    }
    out.push(b')');
    out
}

/// Rough Helvetica width, enough to keep cell text inside its column.
fn fit(text: &str, width_mm: f32, size: f32) -> String {
    let avg_char_mm = size * 0.5 / PT_PER_MM;
    let max_chars = (((width_mm - 2.0 * CELL_PADDING_MM) / avg_char_mm).floor() as usize).max(1);
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

struct Table<'a> {
    headers: &'a [&'a str],
    widths: &'a [f32],
    rows: Vec<Vec<String>>,
}

/// Accumulates page content streams and tracks the write cursor.
struct Layout {
    pages: Vec<Vec<u8>>,
    current: Vec<u8>,
    y: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: MARGIN_MM,
        }
    }

    fn new_page(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.pages.push(finished);
        self.y = MARGIN_MM;
    }

    fn ensure_room(&mut self, height: f32) -> bool {
        if self.y + height > BOTTOM_LIMIT_MM {
            self.new_page();
            true
        } else {
            false
        }
    }

    fn op(&mut self, line: &str) {
        self.current.extend_from_slice(line.as_bytes());
        self.current.push(b'\n');
    }

    fn fill_color(&mut self, (r, g, b): (u8, u8, u8)) {
        let line = format!(
            "{:.3} {:.3} {:.3} rg",
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0
        );
        self.op(&line);
    }

    /// Text whose baseline sits at `baseline_mm` from the top of the page.
    fn text_at(&mut self, x_mm: f32, baseline_mm: f32, size: f32, font: Font, text: &str) {
        let line = format!(
            "BT /{} {:.1} Tf {:.2} {:.2} Td ",
            font.resource(),
            size,
            x_mm * PT_PER_MM,
            (PAGE_HEIGHT_MM - baseline_mm) * PT_PER_MM
        );
        self.current.extend_from_slice(line.as_bytes());
        self.current.extend_from_slice(&pdf_string(text));
        self.current.extend_from_slice(b" Tj ET\n");
    }

    fn rect(&mut self, x_mm: f32, top_mm: f32, width_mm: f32, height_mm: f32) {
        let line = format!(
            "{:.2} {:.2} {:.2} {:.2} re f",
            x_mm * PT_PER_MM,
            (PAGE_HEIGHT_MM - top_mm - height_mm) * PT_PER_MM,
            width_mm * PT_PER_MM,
            height_mm * PT_PER_MM
        );
        self.op(&line);
    }

    /// A line of text at the cursor; the cursor moves down by `advance`.
    fn line(&mut self, x_mm: f32, size: f32, font: Font, text: &str, advance: f32) {
        self.ensure_room(advance);
        self.text_at(x_mm, self.y, size, font, text);
        self.y += advance;
    }

    fn row(&mut self, widths: &[f32], cells: &[String], font: Font) {
        let baseline = self.y + ROW_HEIGHT_MM / 2.0 + TABLE_FONT_SIZE * 0.35 / PT_PER_MM;
        let mut x = MARGIN_MM;
        for (cell, width) in cells.iter().zip(widths) {
            let text = fit(cell, *width, TABLE_FONT_SIZE);
            self.text_at(x + CELL_PADDING_MM, baseline, TABLE_FONT_SIZE, font, &text);
            x += width;
        }
        self.y += ROW_HEIGHT_MM;
    }

    fn header_row(&mut self, table: &Table<'_>) {
        let width: f32 = table.widths.iter().sum();
        self.fill_color(HEADER_FILL);
        self.rect(MARGIN_MM, self.y, width, ROW_HEIGHT_MM);
        self.op("1 g");
        let headers: Vec<String> = table.headers.iter().map(|h| h.to_string()).collect();
        self.row(table.widths, &headers, Font::Bold);
        self.op("0 g");
    }

    /// Striped table; the header row repeats after each page break.
    fn table(&mut self, table: &Table<'_>) {
        let width: f32 = table.widths.iter().sum();
        self.ensure_room(ROW_HEIGHT_MM * 2.0);
        self.header_row(table);
        for (i, cells) in table.rows.iter().enumerate() {
            if self.ensure_room(ROW_HEIGHT_MM) {
                self.header_row(table);
            }
            if i % 2 == 1 {
                self.fill_color(STRIPE_FILL);
                self.rect(MARGIN_MM, self.y, width, ROW_HEIGHT_MM);
                self.op("0 g");
            }
            self.row(table.widths, cells, Font::Regular);
        }
    }

    fn finish(mut self) -> Vec<Vec<u8>> {
        self.pages.push(self.current);
        self.pages
    }
}

/// Serializes page content streams into a complete PDF document.
fn assemble(pages: Vec<Vec<u8>>) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

    let page_count = pages.len();
    let first_page_obj = 5;
    let kids = (0..page_count)
        .map(|i| format!("{} 0 R", first_page_obj + 2 * i))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects: Vec<Vec<u8>> = vec![
        b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, page_count).into_bytes(),
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_vec(),
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
            .to_vec(),
    ];

    for (i, content) in pages.into_iter().enumerate() {
        let content_obj = first_page_obj + 2 * i + 1;
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                PAGE_WIDTH_MM * PT_PER_MM,
                PAGE_HEIGHT_MM * PT_PER_MM,
                content_obj
            )
            .into_bytes(),
        );
        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(&content);
        stream.extend_from_slice(b"\nendstream");
        objects.push(stream);
    }

    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in &offsets {
        let _ = write!(xref, "{:010} 00000 n \n", offset);
    }
    let _ = write!(
        xref,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    );
    out.extend_from_slice(xref.as_bytes());
    out
}

fn money(value: f64, currency: &str) -> String {
    format!("{:.2} {}", value, currency)
}

fn shift_short(shift: Shift) -> &'static str {
    match shift {
        Shift::Morning => "Matin",
        Shift::Night => "Nuit",
    }
}

/// Renders the sales report: summary, transactions, expenses and expenses by category.
pub fn render(report: &SalesReport, options: &PdfOptions) -> Vec<u8> {
    let currency = options.currency.as_str();
    let offset = options.offset;
    let mut layout = Layout::new();

    layout.text_at(MARGIN_MM, 22.0, 18.0, Font::Bold, "Rapport de Ventes - Station-Service");
    let start = report
        .period
        .start_date
        .map_or_else(|| "début".to_string(), date_fr);
    let end = report
        .period
        .end_date
        .map_or_else(|| "fin".to_string(), date_fr);
    layout.text_at(
        MARGIN_MM,
        30.0,
        12.0,
        Font::Regular,
        &format!("Période: {} à {} - {}", start, end, shift_label(report.period.shift)),
    );
    let generated = options.generated_at.with_timezone(&offset);
    layout.text_at(
        MARGIN_MM,
        38.0,
        12.0,
        Font::Regular,
        &format!("Généré le: {}", generated.format("%d/%m/%Y %H:%M")),
    );

    let summary = &report.summary;
    layout.text_at(MARGIN_MM, 50.0, 14.0, Font::Bold, "Résumé");
    let summary_lines = [
        format!("Total Litres: {:.2} L", summary.total_liters),
        format!("Revenus Bruts: {}", money(summary.total_revenue, currency)),
        format!("Total Dépenses: {}", money(summary.total_expenses, currency)),
        format!("Revenus Nets: {}", money(summary.net_revenue, currency)),
    ];
    for (i, line) in summary_lines.iter().enumerate() {
        layout.text_at(20.0, 60.0 + 8.0 * i as f32, 12.0, Font::Regular, line);
    }

    layout.text_at(MARGIN_MM, 100.0, 14.0, Font::Bold, "Transactions");
    layout.y = 105.0;
    layout.table(&Table {
        headers: &[
            "Date",
            "Équipe",
            "Pompe",
            "Index Précédent",
            "Index Actuel",
            "Litres",
            "Prix/L",
            "Revenu",
        ],
        widths: &[28.0, 16.0, 24.0, 24.0, 22.0, 20.0, 22.0, 26.0],
        rows: report
            .transactions
            .iter()
            .map(|row| {
                let tx = &row.transaction;
                vec![
                    format!(
                        "{} {}",
                        local_date_fr(tx.timestamp, offset),
                        tx.timestamp.with_timezone(&offset).format("%H:%M")
                    ),
                    shift_short(tx.shift).to_string(),
                    row.pump_name.clone(),
                    format!("{:.2}", tx.previous_index as f64),
                    format!("{:.2}", tx.current_index as f64),
                    format!("{:.2} L", tx.liters_dispensed),
                    money(tx.price_per_liter, currency),
                    money(tx.revenue, currency),
                ]
            })
            .collect(),
    });

    layout.new_page();
    layout.text_at(MARGIN_MM, 22.0, 14.0, Font::Bold, "Dépenses");
    layout.y = 30.0;
    layout.table(&Table {
        headers: &["Date", "Catégorie", "Description", "Montant"],
        widths: &[30.0, 32.0, 85.0, 35.0],
        rows: report
            .expenses
            .iter()
            .map(|e| {
                vec![
                    date_fr(e.date),
                    e.category.label_fr().to_string(),
                    e.description.clone(),
                    money(e.amount, currency),
                ]
            })
            .collect(),
    });

    let mut by_category: BTreeMap<ExpenseCategory, f64> = BTreeMap::new();
    for e in &report.expenses {
        *by_category.entry(e.category).or_insert(0.0) += e.amount;
    }
    layout.y += 13.0;
    layout.line(MARGIN_MM, 14.0, Font::Bold, "Dépenses par Catégorie", 5.0);
    layout.table(&Table {
        headers: &["Catégorie", "Montant"],
        widths: &[91.0, 91.0],
        rows: by_category
            .into_iter()
            .map(|(category, amount)| vec![category.label_fr().to_string(), money(amount, currency)])
            .collect(),
    });

    assemble(layout.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{expense, fuel_transaction},
        services::reports::{summarize, ReportPeriod, ReportTransaction, ShiftFilter},
    };
    use chrono::{NaiveDate, TimeZone};
    use uuid::Uuid;

    fn report(transaction_count: usize) -> SalesReport {
        let at = Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap();
        let transactions: Vec<ReportTransaction> = (0..transaction_count)
            .map(|i| ReportTransaction {
                transaction: fuel_transaction::Model {
                    id: Uuid::new_v4(),
                    pump_id: Uuid::nil(),
                    sequence: i as i64 + 1,
                    previous_index: 1000 + 10 * i as i64,
                    current_index: 1010 + 10 * i as i64,
                    liters_dispensed: 10.0,
                    price_per_liter: 2.5,
                    revenue: 25.0,
                    fuel_type: "Gasoil".into(),
                    shift: fuel_transaction::Shift::Morning,
                    payment_method: "cash".into(),
                    timestamp: at,
                    created_at: at,
                    updated_at: at,
                },
                pump_name: "Pompe (Est)".into(),
            })
            .collect();
        let expenses = vec![expense::Model {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            category: ExpenseCategory::Filter,
            description: "Filtre à huile".into(),
            amount: 40.0,
            created_at: at,
        }];
        let summary = summarize(transactions.iter().map(|t| &t.transaction), &expenses);
        SalesReport {
            period: ReportPeriod {
                start_date: NaiveDate::from_ymd_opt(2025, 4, 1),
                end_date: NaiveDate::from_ymd_opt(2025, 4, 30),
                shift: ShiftFilter::Morning,
            },
            summary,
            transactions,
            expenses,
        }
    }

    fn options() -> PdfOptions {
        PdfOptions {
            offset: FixedOffset::east_opt(3600).unwrap(),
            currency: "TND".into(),
            generated_at: Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap(),
        }
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn document_frame() {
        let bytes = render(&report(3), &options());
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        assert!(contains(&bytes, b"(Rapport de Ventes - Station-Service)"));
        assert!(contains(&bytes, b"/Count 2"));
    }

    #[test]
    fn french_text_is_win_ansi() {
        let bytes = render(&report(1), &options());
        assert!(contains(
            &bytes,
            b"(P\xE9riode: 01/04/2025 \xE0 30/04/2025 - \xC9quipe Matin)"
        ));
        assert!(contains(&bytes, b"(Revenus Bruts: 25.00 TND)"));
        assert!(contains(&bytes, b"(Pompe \\(Est\\))"));
        assert!(contains(&bytes, b"(Filtre)"));
    }

    #[test]
    fn long_tables_break_pages() {
        let bytes = render(&report(80), &options());
        // 24 rows fit under the summary, 37 on a full page, then the expenses page.
        assert!(contains(&bytes, b"/Count 4 "));
    }

    #[test]
    fn xref_points_at_objects() {
        let bytes = render(&report(2), &options());
        let text = String::from_utf8_lossy(&bytes);
        let startxref = text.rfind("startxref\n").unwrap();
        let offset: usize = text[startxref + 10..]
            .lines()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert!(bytes[offset..].starts_with(b"xref\n"));
    }

    #[test]
    fn unmappable_characters_degrade() {
        assert_eq!(pdf_string("é€✓"), b"(\xE9\x80?)".to_vec());
        assert_eq!(fit("abcdefghijklmnopqrstuvwxyz", 12.0, 9.0), "ab...");
    }
}
