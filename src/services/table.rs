//! Filter + sort pipeline over merged stock rows.
//!
//! `apply` is pure: it borrows the input rows, filters by column constraint,
//! sorts by one column with a stable comparator, and returns fresh clones.
//! Null cells fail active filters and sort after every non-null cell in both
//! directions.

use crate::models::StockRow;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Sortable/filterable columns of the screening table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Symbol,
    MarketCap,
    ForwardPe,
    DividendYield,
    PayoutRatio,
    ProfitMargins,
    ReturnOnEquity,
    PriceToBook,
    EarningsGrowth,
    TotalDebt,
    TotalCash,
    Close,
    Volume,
    RelativeVolume,
    PriceVsSma50Pct,
    Rsi14,
    Atr14,
    AtrPct,
    MarketStage,
    Sma5,
    Sma5DiffPct,
    Sma10,
    Sma10DiffPct,
    Sma20,
    Sma20DiffPct,
    Sma50,
    Sma50DiffPct,
    Sma100,
    Sma100DiffPct,
    Sma200,
    Sma200DiffPct,
    MaAlignment,
}

/// How a column's cells compare and which filters apply to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Number,
    Text,
    Category,
    Ranks,
}

impl Column {
    pub fn kind(self) -> ColumnKind {
        match self {
            Column::Symbol => ColumnKind::Text,
            Column::MarketStage => ColumnKind::Category,
            Column::MaAlignment => ColumnKind::Ranks,
            _ => ColumnKind::Number,
        }
    }

    /// Stable identifier, matching the row's serialized field name.
    pub fn name(self) -> &'static str {
        match self {
            Column::Symbol => "symbol",
            Column::MarketCap => "market_cap",
            Column::ForwardPe => "forward_pe",
            Column::DividendYield => "dividend_yield",
            Column::PayoutRatio => "payout_ratio",
            Column::ProfitMargins => "profit_margins",
            Column::ReturnOnEquity => "return_on_equity",
            Column::PriceToBook => "price_to_book",
            Column::EarningsGrowth => "earnings_growth",
            Column::TotalDebt => "total_debt",
            Column::TotalCash => "total_cash",
            Column::Close => "close",
            Column::Volume => "volume",
            Column::RelativeVolume => "relative_volume",
            Column::PriceVsSma50Pct => "price_vs_sma_50_pct",
            Column::Rsi14 => "rsi_14",
            Column::Atr14 => "atr_14",
            Column::AtrPct => "atr_pct",
            Column::MarketStage => "market_stage",
            Column::Sma5 => "sma_5",
            Column::Sma5DiffPct => "sma_5_diff_pct",
            Column::Sma10 => "sma_10",
            Column::Sma10DiffPct => "sma_10_diff_pct",
            Column::Sma20 => "sma_20",
            Column::Sma20DiffPct => "sma_20_diff_pct",
            Column::Sma50 => "sma_50",
            Column::Sma50DiffPct => "sma_50_diff_pct",
            Column::Sma100 => "sma_100",
            Column::Sma100DiffPct => "sma_100_diff_pct",
            Column::Sma200 => "sma_200",
            Column::Sma200DiffPct => "sma_200_diff_pct",
            Column::MaAlignment => "ma_alignment",
        }
    }

    /// Parse a column identifier as produced by [`Column::name`].
    pub fn parse(name: &str) -> Option<Self> {
        const ALL: [Column; 32] = [
            Column::Symbol,
            Column::MarketCap,
            Column::ForwardPe,
            Column::DividendYield,
            Column::PayoutRatio,
            Column::ProfitMargins,
            Column::ReturnOnEquity,
            Column::PriceToBook,
            Column::EarningsGrowth,
            Column::TotalDebt,
            Column::TotalCash,
            Column::Close,
            Column::Volume,
            Column::RelativeVolume,
            Column::PriceVsSma50Pct,
            Column::Rsi14,
            Column::Atr14,
            Column::AtrPct,
            Column::MarketStage,
            Column::Sma5,
            Column::Sma5DiffPct,
            Column::Sma10,
            Column::Sma10DiffPct,
            Column::Sma20,
            Column::Sma20DiffPct,
            Column::Sma50,
            Column::Sma50DiffPct,
            Column::Sma100,
            Column::Sma100DiffPct,
            Column::Sma200,
            Column::Sma200DiffPct,
            Column::MaAlignment,
        ];
        ALL.into_iter().find(|c| c.name() == name)
    }
}

/// A row's cell for one column. `Null` covers absent values and NaN.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue<'a> {
    Number(f64),
    Text(&'a str),
    Ranks(&'a [u32]),
    Null,
}

fn number_cell(value: Option<f64>) -> CellValue<'static> {
    match value {
        Some(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Null,
    }
}

/// Extract the cell for `column` from `row`.
pub fn column_value(row: &StockRow, column: Column) -> CellValue<'_> {
    match column {
        Column::Symbol => CellValue::Text(&row.symbol),
        Column::MarketCap => number_cell(row.market_cap),
        Column::ForwardPe => number_cell(row.forward_pe),
        Column::DividendYield => number_cell(row.dividend_yield),
        Column::PayoutRatio => number_cell(row.payout_ratio),
        Column::ProfitMargins => number_cell(row.profit_margins),
        Column::ReturnOnEquity => number_cell(row.return_on_equity),
        Column::PriceToBook => number_cell(row.price_to_book),
        Column::EarningsGrowth => number_cell(row.earnings_growth),
        Column::TotalDebt => number_cell(row.total_debt),
        Column::TotalCash => number_cell(row.total_cash),
        Column::Close => number_cell(row.close),
        Column::Volume => number_cell(row.volume),
        Column::RelativeVolume => number_cell(row.relative_volume),
        Column::PriceVsSma50Pct => number_cell(row.price_vs_sma_50_pct),
        Column::Rsi14 => number_cell(row.rsi_14),
        Column::Atr14 => number_cell(row.atr_14),
        Column::AtrPct => number_cell(row.atr_pct),
        Column::MarketStage => match row.market_stage.as_deref() {
            Some(stage) => CellValue::Text(stage),
            None => CellValue::Null,
        },
        Column::Sma5 => number_cell(row.sma_5),
        Column::Sma5DiffPct => number_cell(row.sma_5_diff_pct),
        Column::Sma10 => number_cell(row.sma_10),
        Column::Sma10DiffPct => number_cell(row.sma_10_diff_pct),
        Column::Sma20 => number_cell(row.sma_20),
        Column::Sma20DiffPct => number_cell(row.sma_20_diff_pct),
        Column::Sma50 => number_cell(row.sma_50),
        Column::Sma50DiffPct => number_cell(row.sma_50_diff_pct),
        Column::Sma100 => number_cell(row.sma_100),
        Column::Sma100DiffPct => number_cell(row.sma_100_diff_pct),
        Column::Sma200 => number_cell(row.sma_200),
        Column::Sma200DiffPct => number_cell(row.sma_200_diff_pct),
        Column::MaAlignment => match row.ma_alignment.as_deref() {
            Some(ranks) => CellValue::Ranks(ranks),
            None => CellValue::Null,
        },
    }
}

/// Per-column constraint. A row must satisfy every active filter to survive.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Numeric range; a bound of `None` is open on that side. An active
    /// range filter with both bounds open still excludes null cells.
    Range { min: Option<f64>, max: Option<f64> },
    /// Exact-match membership for category columns. An empty set imposes no
    /// constraint beyond requiring a non-null cell.
    OneOf(HashSet<String>),
    /// Case-insensitive substring match for text columns.
    Contains(String),
}

impl Filter {
    fn passes(&self, cell: &CellValue<'_>) -> bool {
        match (self, cell) {
            (Filter::Range { min, max }, CellValue::Number(n)) => {
                min.map_or(true, |lo| *n >= lo) && max.map_or(true, |hi| *n <= hi)
            }
            (Filter::OneOf(allowed), CellValue::Text(s)) => {
                allowed.is_empty() || allowed.contains(*s)
            }
            (Filter::Contains(needle), CellValue::Text(s)) => {
                s.to_lowercase().contains(&needle.to_lowercase())
            }
            // Null cells fail every active filter; mismatched filter/cell
            // kinds likewise fail rather than passing vacuously.
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Single active sort key.
#[derive(Debug, Clone, Copy)]
pub struct SortSpec {
    pub column: Column,
    pub direction: Direction,
}

/// Filter and sort `rows`. Pure: inputs are not mutated, ties keep their
/// original relative order.
pub fn apply(
    rows: &[StockRow],
    filters: &HashMap<Column, Filter>,
    sort: Option<SortSpec>,
) -> Vec<StockRow> {
    let mut selected: Vec<StockRow> = rows
        .iter()
        .filter(|row| {
            filters
                .iter()
                .all(|(column, filter)| filter.passes(&column_value(row, *column)))
        })
        .cloned()
        .collect();

    if let Some(spec) = sort {
        selected.sort_by(|a, b| compare_rows(a, b, spec));
    }

    debug!(
        input = rows.len(),
        output = selected.len(),
        filters = filters.len(),
        "applied table pipeline"
    );
    selected
}

fn compare_rows(a: &StockRow, b: &StockRow, spec: SortSpec) -> Ordering {
    let left = column_value(a, spec.column);
    let right = column_value(b, spec.column);

    // Nulls sort last in both directions; only comparisons between two
    // non-null cells respond to the direction flag.
    match (&left, &right) {
        (CellValue::Null, CellValue::Null) => Ordering::Equal,
        (CellValue::Null, _) => Ordering::Greater,
        (_, CellValue::Null) => Ordering::Less,
        _ => {
            let ordering = compare_cells(&left, &right);
            match spec.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        }
    }
}

fn compare_cells(left: &CellValue<'_>, right: &CellValue<'_>) -> Ordering {
    match (left, right) {
        (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
        (CellValue::Text(a), CellValue::Text(b)) => {
            a.to_lowercase().cmp(&b.to_lowercase())
        }
        (CellValue::Ranks(a), CellValue::Ranks(b)) => compare_alignment(a, b),
        _ => Ordering::Equal,
    }
}

/// Position-by-position comparison of two alignment sequences. The first
/// differing rank decides; a missing position compares lowest, so a longer
/// sequence sorts after an equal prefix.
pub fn compare_alignment(a: &[u32], b: &[u32]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let ordering = match (a.get(i), b.get(i)) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(symbol: &str) -> StockRow {
        StockRow::new(symbol)
    }

    fn symbols(rows: &[StockRow]) -> Vec<&str> {
        rows.iter().map(|r| r.symbol.as_str()).collect()
    }

    #[test]
    fn range_filter_excludes_null_even_with_open_bounds() {
        let mut with_rsi = row("A");
        with_rsi.rsi_14 = Some(55.0);
        let without_rsi = row("B");

        let mut filters = HashMap::new();
        filters.insert(Column::Rsi14, Filter::Range { min: None, max: None });

        let out = apply(&[with_rsi, without_rsi], &filters, None);
        assert_eq!(symbols(&out), vec!["A"]);
    }

    #[test]
    fn range_filter_applies_bounds() {
        let mut low = row("LOW");
        low.rsi_14 = Some(25.0);
        let mut mid = row("MID");
        mid.rsi_14 = Some(50.0);
        let mut high = row("HIGH");
        high.rsi_14 = Some(75.0);

        let mut filters = HashMap::new();
        filters.insert(
            Column::Rsi14,
            Filter::Range {
                min: Some(30.0),
                max: Some(70.0),
            },
        );

        let out = apply(&[low, mid, high], &filters, None);
        assert_eq!(symbols(&out), vec!["MID"]);
    }

    #[test]
    fn one_of_filter_matches_categories() {
        let mut a = row("A");
        a.market_stage = Some("Stage 2".to_string());
        let mut b = row("B");
        b.market_stage = Some("Stage 4".to_string());
        let c = row("C");

        let mut filters = HashMap::new();
        filters.insert(
            Column::MarketStage,
            Filter::OneOf(["Stage 2".to_string()].into_iter().collect()),
        );

        let out = apply(&[a.clone(), b, c.clone()], &filters, None);
        assert_eq!(symbols(&out), vec!["A"]);

        // Empty set: any non-null stage passes, null still fails.
        let mut filters = HashMap::new();
        filters.insert(Column::MarketStage, Filter::OneOf(HashSet::new()));
        let out = apply(&[a, c], &filters, None);
        assert_eq!(symbols(&out), vec!["A"]);
    }

    #[test]
    fn contains_filter_is_case_insensitive() {
        let rows = vec![row("AAPL"), row("MSFT"), row("aamc")];
        let mut filters = HashMap::new();
        filters.insert(Column::Symbol, Filter::Contains("aa".to_string()));

        let out = apply(&rows, &filters, None);
        assert_eq!(symbols(&out), vec!["AAPL", "aamc"]);
    }

    #[test]
    fn numeric_sort_places_nulls_last_both_directions() {
        let mut a = row("A");
        a.close = Some(10.0);
        let b = row("B");
        let mut c = row("C");
        c.close = Some(30.0);

        let rows = vec![a, b, c];
        let filters = HashMap::new();

        let asc = apply(
            &rows,
            &filters,
            Some(SortSpec {
                column: Column::Close,
                direction: Direction::Ascending,
            }),
        );
        assert_eq!(symbols(&asc), vec!["A", "C", "B"]);

        let desc = apply(
            &rows,
            &filters,
            Some(SortSpec {
                column: Column::Close,
                direction: Direction::Descending,
            }),
        );
        assert_eq!(symbols(&desc), vec!["C", "A", "B"]);
    }

    #[test]
    fn alignment_sort_decides_at_first_differing_rank() {
        let mut strong = row("STRONG");
        strong.ma_alignment = Some(vec![200, 100, 50, 20]);
        let mut weak = row("WEAK");
        weak.ma_alignment = Some(vec![200, 100, 50, 10]);

        let rows = vec![weak.clone(), strong.clone()];
        let filters = HashMap::new();

        let desc = apply(
            &rows,
            &filters,
            Some(SortSpec {
                column: Column::MaAlignment,
                direction: Direction::Descending,
            }),
        );
        assert_eq!(symbols(&desc), vec!["STRONG", "WEAK"]);

        let asc = apply(
            &rows,
            &filters,
            Some(SortSpec {
                column: Column::MaAlignment,
                direction: Direction::Ascending,
            }),
        );
        assert_eq!(symbols(&asc), vec!["WEAK", "STRONG"]);
    }

    #[test]
    fn alignment_missing_rank_compares_lowest() {
        assert_eq!(
            compare_alignment(&[200, 100], &[200, 100, 50]),
            Ordering::Less
        );
        assert_eq!(compare_alignment(&[200, 100], &[200, 100]), Ordering::Equal);
        assert_eq!(compare_alignment(&[], &[5]), Ordering::Less);
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let mut a = row("A");
        a.close = Some(10.0);
        a.volume = Some(1.0);
        let mut b = row("B");
        b.close = Some(10.0);
        b.volume = Some(2.0);
        let mut c = row("C");
        c.close = Some(10.0);
        c.volume = Some(3.0);

        let rows = vec![b, a, c];
        let out = apply(
            &rows,
            &HashMap::new(),
            Some(SortSpec {
                column: Column::Close,
                direction: Direction::Descending,
            }),
        );
        assert_eq!(symbols(&out), vec!["B", "A", "C"]);
    }

    #[test]
    fn text_sort_ignores_case() {
        let rows = vec![row("beta"), row("ALPHA"), row("Gamma")];
        let out = apply(
            &rows,
            &HashMap::new(),
            Some(SortSpec {
                column: Column::Symbol,
                direction: Direction::Ascending,
            }),
        );
        assert_eq!(symbols(&out), vec!["ALPHA", "beta", "Gamma"]);
    }

    #[test]
    fn column_names_roundtrip() {
        for name in ["rsi_14", "ma_alignment", "market_stage", "sma_50_diff_pct"] {
            let column = Column::parse(name).unwrap();
            assert_eq!(column.name(), name);
        }
        assert!(Column::parse("nope").is_none());
    }

    #[test]
    fn apply_does_not_mutate_input() {
        let rows = vec![row("A"), row("B")];
        let before = rows.clone();
        let _ = apply(
            &rows,
            &HashMap::new(),
            Some(SortSpec {
                column: Column::Symbol,
                direction: Direction::Descending,
            }),
        );
        assert_eq!(rows, before);
    }
}
