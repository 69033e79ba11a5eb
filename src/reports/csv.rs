use crate::{errors::ServiceError, services::reports::ReportTransaction};
use chrono::FixedOffset;

pub const HEADER: [&str; 8] = [
    "Date",
    "Heure",
    "Pompe",
    "Index Précédent",
    "Index Actuel",
    "Litres Distribués",
    "Prix par Litre",
    "Revenu",
];

/// Two decimals with a decimal comma.
pub fn decimal_fr(value: f64) -> String {
    format!("{:.2}", value).replace('.', ",")
}

/// One row per transaction, dates and times in station local time.
pub fn render(
    transactions: &[ReportTransaction],
    offset: FixedOffset,
) -> Result<Vec<u8>, ServiceError> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    writer
        .write_record(HEADER)
        .map_err(|e| ServiceError::InternalError(format!("CSV write failed: {}", e)))?;

    for row in transactions {
        let tx = &row.transaction;
        let local = tx.timestamp.with_timezone(&offset);
        writer
            .write_record([
                local.format("%d/%m/%Y").to_string(),
                local.format("%H:%M:%S").to_string(),
                row.pump_name.clone(),
                decimal_fr(tx.previous_index as f64),
                decimal_fr(tx.current_index as f64),
                decimal_fr(tx.liters_dispensed),
                decimal_fr(tx.price_per_liter),
                decimal_fr(tx.revenue),
            ])
            .map_err(|e| ServiceError::InternalError(format!("CSV write failed: {}", e)))?;
    }

    writer
        .into_inner()
        .map_err(|e| ServiceError::InternalError(format!("CSV flush failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fuel_transaction::{self, Shift};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn row() -> ReportTransaction {
        let at = Utc.with_ymd_and_hms(2025, 4, 1, 7, 5, 9).unwrap();
        ReportTransaction {
            transaction: fuel_transaction::Model {
                id: Uuid::new_v4(),
                pump_id: Uuid::new_v4(),
                sequence: 1,
                previous_index: 1000,
                current_index: 1200,
                liters_dispensed: 200.0,
                price_per_liter: 2.5,
                revenue: 500.0,
                fuel_type: "Gasoil".into(),
                shift: Shift::Morning,
                payment_method: "cash".into(),
                timestamp: at,
                created_at: at,
                updated_at: at,
            },
            pump_name: "Pompe 1".into(),
        }
    }

    #[test]
    fn decimal_comma() {
        assert_eq!(decimal_fr(2.5), "2,50");
        assert_eq!(decimal_fr(1000.0), "1000,00");
        assert_eq!(decimal_fr(0.126), "0,13");
    }

    #[test]
    fn header_and_row_in_local_time() {
        let bytes = render(&[row()], FixedOffset::east_opt(3600).unwrap()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Date,Heure,Pompe,Index Précédent,Index Actuel,Litres Distribués,Prix par Litre,Revenu")
        );
        assert_eq!(
            lines.next(),
            Some(r#"01/04/2025,08:05:09,Pompe 1,"1000,00","1200,00","200,00","2,50","500,00""#)
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_report_is_header_only() {
        let bytes = render(&[], FixedOffset::east_opt(0).unwrap()).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap().lines().count(), 1);
    }
}
