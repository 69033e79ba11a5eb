use crate::{
    db::DbPool,
    errors::ServiceError,
    models::{
        expense::{self, Entity as ExpenseEntity},
        fuel_transaction::{self, Shift},
        pump,
    },
    reports::{self, ExportFile},
    services::period::day_bounds,
};
use chrono::{FixedOffset, NaiveDate, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Which shift a report covers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShiftFilter {
    #[default]
    All,
    Morning,
    Night,
}

impl ShiftFilter {
    /// Matches on the shift containing the timestamp in station local time,
    /// not on the shift stored with the transaction.
    pub fn matches(&self, transaction: &fuel_transaction::Model, offset: FixedOffset) -> bool {
        match self {
            ShiftFilter::All => true,
            ShiftFilter::Morning => Shift::containing(transaction.timestamp, offset) == Shift::Morning,
            ShiftFilter::Night => Shift::containing(transaction.timestamp, offset) == Shift::Night,
        }
    }
}

impl From<Shift> for ShiftFilter {
    fn from(shift: Shift) -> Self {
        match shift {
            Shift::Morning => ShiftFilter::Morning,
            Shift::Night => ShiftFilter::Night,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
    Pdf,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ReportFormat::Json => "application/json",
            ReportFormat::Csv => reports::CSV_CONTENT_TYPE,
            ReportFormat::Pdf => reports::PDF_CONTENT_TYPE,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub shift: ShiftFilter,
    #[serde(default)]
    pub format: ReportFormat,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DailyReportQuery {
    pub date: NaiveDate,
    pub shift: Shift,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FuelTypeTotals {
    pub count: u64,
    pub amount: f64,
    pub liters: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentMethodTotals {
    pub count: u64,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub total_transactions: u64,
    pub total_liters: f64,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub net_revenue: f64,
    pub fuel_type_summary: BTreeMap<String, FuelTypeTotals>,
    pub payment_method_summary: BTreeMap<String, PaymentMethodTotals>,
    pub expenses_by_category: BTreeMap<String, f64>,
}

/// A transaction with the name of its pump, as exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportTransaction {
    #[serde(flatten)]
    pub transaction: fuel_transaction::Model,
    pub pump_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub shift: ShiftFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SalesReport {
    pub period: ReportPeriod,
    pub summary: SalesSummary,
    pub transactions: Vec<ReportTransaction>,
    pub expenses: Vec<expense::Model>,
}

/// A report rendered either as JSON or as a downloadable file.
#[derive(Debug)]
pub enum ReportOutput {
    Json(SalesReport),
    File(ExportFile),
}

/// Keeps the transactions of one shift.
pub fn filter_by_shift(
    transactions: Vec<ReportTransaction>,
    shift: ShiftFilter,
    offset: FixedOffset,
) -> Vec<ReportTransaction> {
    transactions
        .into_iter()
        .filter(|t| shift.matches(&t.transaction, offset))
        .collect()
}

/// Totals and breakdowns over a set of sales and expenses.
pub fn summarize<'a>(
    transactions: impl IntoIterator<Item = &'a fuel_transaction::Model>,
    expenses: &[expense::Model],
) -> SalesSummary {
    let mut summary = SalesSummary::default();

    for tx in transactions {
        summary.total_transactions += 1;
        summary.total_liters += tx.liters_dispensed;
        summary.total_revenue += tx.revenue;

        let fuel = summary
            .fuel_type_summary
            .entry(tx.fuel_type.clone())
            .or_default();
        fuel.count += 1;
        fuel.amount += tx.revenue;
        fuel.liters += tx.liters_dispensed;

        let method = summary
            .payment_method_summary
            .entry(tx.payment_method.clone())
            .or_default();
        method.count += 1;
        method.amount += tx.revenue;
    }

    for e in expenses {
        summary.total_expenses += e.amount;
        *summary
            .expenses_by_category
            .entry(e.category.to_string())
            .or_insert(0.0) += e.amount;
    }

    summary.net_revenue = summary.total_revenue - summary.total_expenses;
    summary
}

/// Sales and expense reports over local calendar ranges
#[derive(Clone)]
pub struct ReportService {
    db_pool: Arc<DbPool>,
    station_offset: FixedOffset,
    currency: String,
}

impl ReportService {
    pub fn new(db_pool: Arc<DbPool>, station_offset: FixedOffset, currency: String) -> Self {
        Self {
            db_pool,
            station_offset,
            currency,
        }
    }

    async fn transactions_in(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<ReportTransaction>, ServiceError> {
        let range = day_bounds(start, end, self.station_offset)?;
        let db = self.db_pool.as_ref();

        let mut query = fuel_transaction::Entity::find();
        if let Some(start) = range.start {
            query = query.filter(fuel_transaction::Column::Timestamp.gte(start));
        }
        if let Some(end) = range.end {
            query = query.filter(fuel_transaction::Column::Timestamp.lt(end));
        }
        let rows = query
            .order_by_asc(fuel_transaction::Column::Timestamp)
            .order_by_asc(fuel_transaction::Column::Sequence)
            .all(db)
            .await?;

        let names: HashMap<Uuid, String> = pump::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();

        Ok(rows
            .into_iter()
            .map(|transaction| {
                let pump_name = names
                    .get(&transaction.pump_id)
                    .cloned()
                    .unwrap_or_else(|| format!("Pompe {}", transaction.pump_id));
                ReportTransaction {
                    transaction,
                    pump_name,
                }
            })
            .collect())
    }

    async fn expenses_in(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<expense::Model>, ServiceError> {
        let mut query = ExpenseEntity::find();
        if let Some(start) = start {
            query = query.filter(expense::Column::Date.gte(start));
        }
        if let Some(end) = end {
            query = query.filter(expense::Column::Date.lte(end));
        }
        Ok(query
            .order_by_asc(expense::Column::Date)
            .order_by_asc(expense::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?)
    }

    /// Transactions of the range and shift, expenses of the range, and their summary.
    #[instrument(skip(self))]
    pub async fn sales_report(&self, query: &ReportQuery) -> Result<SalesReport, ServiceError> {
        let transactions = filter_by_shift(
            self.transactions_in(query.start_date, query.end_date).await?,
            query.shift,
            self.station_offset,
        );
        let expenses = self.expenses_in(query.start_date, query.end_date).await?;
        let summary = summarize(transactions.iter().map(|t| &t.transaction), &expenses);

        info!(
            shift = %query.shift,
            transactions = summary.total_transactions,
            revenue = summary.total_revenue,
            "sales report generated"
        );

        Ok(SalesReport {
            period: ReportPeriod {
                start_date: query.start_date,
                end_date: query.end_date,
                shift: query.shift,
            },
            summary,
            transactions,
            expenses,
        })
    }

    /// Builds the report in the requested format.
    #[instrument(skip(self))]
    pub async fn export(&self, query: &ReportQuery) -> Result<ReportOutput, ServiceError> {
        let report = self.sales_report(query).await?;
        let filename = reports::period_file_name(
            query.start_date,
            query.end_date,
            query.shift,
            query.format.extension(),
        );
        let bytes = match query.format {
            ReportFormat::Json => return Ok(ReportOutput::Json(report)),
            ReportFormat::Csv => reports::csv::render(&report.transactions, self.station_offset)?,
            ReportFormat::Pdf => reports::pdf::render(
                &report,
                &reports::pdf::PdfOptions {
                    offset: self.station_offset,
                    currency: self.currency.clone(),
                    generated_at: Utc::now(),
                },
            ),
        };
        Ok(ReportOutput::File(ExportFile {
            filename,
            content_type: query.format.mime_type(),
            bytes,
        }))
    }

    /// CSV of one calendar date restricted to one shift.
    #[instrument(skip(self))]
    pub async fn daily_shift_report(
        &self,
        date: NaiveDate,
        shift: Shift,
    ) -> Result<ExportFile, ServiceError> {
        let transactions = filter_by_shift(
            self.transactions_in(Some(date), Some(date)).await?,
            shift.into(),
            self.station_offset,
        );
        info!(%date, %shift, transactions = transactions.len(), "daily shift report generated");
        Ok(ExportFile::csv(
            reports::daily_file_name(date, shift),
            reports::csv::render(&transactions, self.station_offset)?,
        ))
    }
}
