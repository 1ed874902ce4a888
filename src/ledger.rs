//! The ledger store: transactions, budgets, aggregates and the data file codec.
//!
//! Transactions are kept in insertion order and addressed by position. Any
//! delete or sort renumbers the positions that follow. Budgets are unique by
//! category and keep their insertion order when updated.
//!
//! # Data file
//!
//! One transaction per line, no header: `date,category,amount,description`.
//! The description is everything after the third comma. Commas inside
//! descriptions are written as `;`. Categories are written verbatim, so a
//! category containing a comma does not survive a save/load cycle.

use crate::budget::{Budget, BudgetChange, BudgetStatus};
use crate::error::{LedgerError, Result};
use crate::money::Amount;
use crate::transaction::Transaction;
use crate::validate::{is_year_month, trim, validate_date};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

/// How [`Ledger::search`] matches its query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Case-sensitive substring of the category.
    CategorySubstring,
    /// Exact date; the query must itself be a valid date.
    ExactDate,
}

/// Ordering applied by [`Ledger::sort`]. Both orders are ascending and stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Lexicographic on the date string.
    Date,
    /// Numeric on the amount.
    Amount,
}

/// Income and expense totals for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlySummary {
    /// Sum of non-negative amounts.
    pub income: Amount,
    /// Sum of negative amounts (itself negative or zero).
    pub expense: Amount,
    /// `income + expense`.
    pub net: Amount,
}

/// Why a data file line was not loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    InvalidDate(String),
    InvalidAmount(String),
    /// The line could not be decoded at all (e.g. invalid UTF-8).
    Malformed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InvalidDate(d) => write!(f, "invalid date format {:?}", d),
            SkipReason::InvalidAmount(a) => write!(f, "invalid amount {:?}", a),
            SkipReason::Malformed(e) => write!(f, "malformed line: {}", e),
        }
    }
}

/// A data file line that was skipped during load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the source.
    pub line: u64,
    pub reason: SkipReason,
}

/// Outcome of a successful load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Number of transactions now in the ledger.
    pub loaded: usize,
    pub skipped: Vec<SkippedRow>,
}

/// Owner of all transactions and budgets.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    budgets: Vec<Budget>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Ledger::default()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Transaction> {
        self.transactions.get(index)
    }

    /// Appends a transaction at the end.
    pub fn add(&mut self, transaction: Transaction) {
        debug!(
            "Adding transaction {} {} {}",
            transaction.date(),
            transaction.category(),
            transaction.amount()
        );
        self.transactions.push(transaction);
    }

    /// Removes and returns the transaction at `index`.
    pub fn delete_at(&mut self, index: usize) -> Result<Transaction> {
        if index >= self.transactions.len() {
            return Err(LedgerError::IndexOutOfRange {
                index: i64::try_from(index).unwrap_or(i64::MAX),
                len: self.transactions.len(),
            });
        }

        let removed = self.transactions.remove(index);
        debug!("Deleted transaction at index {}", index);
        Ok(removed)
    }

    /// Iterates `(position, transaction)` pairs in current order.
    pub fn list(&self) -> impl Iterator<Item = (usize, &Transaction)> + Clone + '_ {
        self.transactions.iter().enumerate()
    }

    /// Writes every transaction to `path`, replacing its contents.
    ///
    /// Returns the number of lines written.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| LedgerError::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;

        let written = self
            .write_to(BufWriter::new(file))
            .map_err(|e| match e {
                LedgerError::Io(source) => LedgerError::FileWrite {
                    path: path.to_path_buf(),
                    source,
                },
                other => other,
            })?;

        info!("Saved {} transactions to {}", written, path.display());
        Ok(written)
    }

    /// Serializes every transaction to `writer` in data file format.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Never)
            .from_writer(writer);

        for transaction in &self.transactions {
            csv_writer.serialize(transaction.to_row())?;
        }

        csv_writer.flush()?;
        Ok(self.transactions.len())
    }

    /// Replaces all transactions with the contents of `path`.
    ///
    /// If the file cannot be opened the ledger is left untouched. Lines with a
    /// bad date or amount are skipped and reported, never fatal.
    pub fn load_from<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LedgerError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let report = self.read_from(file)?;
        info!(
            "Loaded {} transactions from {} ({} skipped)",
            report.loaded,
            path.display(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Replaces all transactions with those decoded from `reader`.
    ///
    /// The ledger is only modified once the whole input has been read.
    pub fn read_from<R: Read>(&mut self, reader: R) -> Result<LoadReport> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .terminator(Terminator::Any(b'\n'))
            .from_reader(reader);

        let mut loaded = Vec::new();
        let mut skipped = Vec::new();

        for result in csv_reader.records() {
            let (line, outcome) = match result {
                Ok(record) => {
                    let line = record.position().map(|p| p.line()).unwrap_or(0);
                    (line, parse_record(&record))
                }
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or(0);
                    (line, Err(SkipReason::Malformed(e.to_string())))
                }
            };

            match outcome {
                Ok(transaction) => loaded.push(transaction),
                Err(reason) => {
                    warn!("Line {}: {}, skipping", line, reason);
                    skipped.push(SkippedRow { line, reason });
                }
            }
        }

        self.transactions = loaded;
        Ok(LoadReport {
            loaded: self.transactions.len(),
            skipped,
        })
    }

    /// Totals income and expense for transactions dated in `year_month`.
    ///
    /// `year_month` must be seven characters with `-` at position 4.
    pub fn monthly_summary(&self, year_month: &str) -> Result<MonthlySummary> {
        if !is_year_month(year_month) {
            return Err(LedgerError::InvalidFormat {
                expected: "YYYY-MM",
                got: year_month.to_string(),
            });
        }

        let in_month: Vec<&Transaction> = self
            .transactions
            .iter()
            .filter(|t| t.date().get(..7) == Some(year_month))
            .collect();

        let income: Amount = in_month
            .iter()
            .filter(|t| !t.is_expense())
            .map(|t| t.amount())
            .sum();
        let expense: Amount = in_month
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| t.amount())
            .sum();

        Ok(MonthlySummary {
            income,
            expense,
            net: income + expense,
        })
    }

    /// Finds transactions matching `query`, keeping their positions.
    pub fn search(&self, mode: SearchMode, query: &str) -> Result<Vec<(usize, &Transaction)>> {
        let matches: Vec<(usize, &Transaction)> = match mode {
            SearchMode::CategorySubstring => self
                .list()
                .filter(|(_, t)| t.category().contains(query))
                .collect(),
            SearchMode::ExactDate => {
                if !validate_date(query) {
                    return Err(LedgerError::InvalidFormat {
                        expected: "YYYY-MM-DD",
                        got: query.to_string(),
                    });
                }
                self.list().filter(|(_, t)| t.date() == query).collect()
            }
        };

        Ok(matches)
    }

    /// Reorders the stored transactions in place.
    pub fn sort(&mut self, key: SortKey) {
        match key {
            SortKey::Date => self.transactions.sort_by(|a, b| a.date().cmp(b.date())),
            SortKey::Amount => self.transactions.sort_by_key(|t| t.amount()),
        }
        debug!("Sorted {} transactions by {:?}", self.transactions.len(), key);
    }

    /// Sets the limit for `category`, creating the budget if needed.
    ///
    /// The category is trimmed and matched exactly (case-sensitive).
    pub fn add_or_update_budget(&mut self, category: &str, limit: Amount) -> Result<BudgetChange> {
        let category = trim(category);
        if category.is_empty() {
            return Err(LedgerError::EmptyCategory);
        }
        if limit.is_negative() {
            return Err(LedgerError::NegativeLimit(limit));
        }

        if let Some(budget) = self.budgets.iter_mut().find(|b| b.category() == category) {
            budget.set_limit(limit);
            debug!("Updated budget for {} to {}", category, limit);
            return Ok(BudgetChange::Updated);
        }

        self.budgets.push(Budget::new(category, limit));
        debug!("Added budget for {} of {}", category, limit);
        Ok(BudgetChange::Added)
    }

    /// Iterates budgets in the order they were first added.
    pub fn budgets(&self) -> impl Iterator<Item = &Budget> + Clone + '_ {
        self.budgets.iter()
    }

    /// Compares expense totals per category against each budget.
    ///
    /// Returns [`LedgerError::NoBudgetsDefined`] rather than an empty list
    /// when there are no budgets.
    pub fn check_budgets(&self) -> Result<Vec<BudgetStatus>> {
        if self.budgets.is_empty() {
            return Err(LedgerError::NoBudgetsDefined);
        }

        let mut spent: HashMap<&str, Amount> = HashMap::new();
        for transaction in self.transactions.iter().filter(|t| t.is_expense()) {
            *spent.entry(transaction.category()).or_default() += transaction.amount().abs();
        }

        Ok(self
            .budgets
            .iter()
            .map(|b| {
                let total = spent.get(b.category()).copied().unwrap_or(Amount::ZERO);
                BudgetStatus::new(b, total)
            })
            .collect())
    }
}

/// Decodes one data file record.
///
/// Fields past the third are rejoined: the description may contain commas.
/// A bare `\r` inside a line is ordinary description text.
fn parse_record(record: &StringRecord) -> std::result::Result<Transaction, SkipReason> {
    let field = |i: usize| trim(record.get(i).unwrap_or(""));

    let date = field(0);
    if !validate_date(date) {
        return Err(SkipReason::InvalidDate(date.to_string()));
    }

    let category = field(1);
    let amount_str = field(2);
    let amount =
        Amount::from_str(amount_str).map_err(|_| SkipReason::InvalidAmount(amount_str.to_string()))?;

    // Lines end at `\n` only; a CRLF ending leaves its `\r` on the last field.
    let description = record.iter().skip(3).collect::<Vec<_>>().join(",");
    let description = description.strip_suffix('\r').unwrap_or(&description);

    Ok(Transaction::new(date, category, amount, description))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tx(date: &str, category: &str, amount: i64) -> Transaction {
        Transaction::new(date, category, Amount::from(amount), "")
    }

    fn ledger_of(transactions: Vec<Transaction>) -> Ledger {
        let mut ledger = Ledger::new();
        for t in transactions {
            ledger.add(t);
        }
        ledger
    }

    #[test]
    fn test_add_appends_in_order() {
        let ledger = ledger_of(vec![tx("2024-01-02", "B", 1), tx("2024-01-01", "A", 2)]);
        let categories: Vec<_> = ledger.list().map(|(_, t)| t.category()).collect();
        assert_eq!(categories, vec!["B", "A"]);
    }

    #[test]
    fn test_delete_renumbers() {
        let mut ledger = ledger_of(vec![
            tx("2024-01-01", "A", 1),
            tx("2024-01-02", "B", 2),
            tx("2024-01-03", "C", 3),
        ]);

        let removed = ledger.delete_at(1).unwrap();
        assert_eq!(removed.category(), "B");
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.get(1).unwrap().category(), "C");
    }

    #[test]
    fn test_delete_out_of_range() {
        let mut ledger = ledger_of(vec![tx("2024-01-01", "A", 1)]);
        let err = ledger.delete_at(1).unwrap_err();
        assert!(matches!(err, LedgerError::IndexOutOfRange { index: 1, len: 1 }));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_list_is_restartable() {
        let ledger = ledger_of(vec![tx("2024-01-01", "A", 1), tx("2024-01-02", "B", 2)]);
        let rows = ledger.list();
        assert_eq!(rows.clone().count(), 2);
        assert_eq!(rows.map(|(i, _)| i).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(Ledger::new().list().count(), 0);
    }

    #[test]
    fn test_monthly_summary() {
        let ledger = ledger_of(vec![
            tx("2024-03-05", "Food", -20),
            tx("2024-03-10", "Salary", 1000),
            tx("2024-04-01", "Food", -5),
        ]);

        let summary = ledger.monthly_summary("2024-03").unwrap();
        assert_eq!(summary.income.to_string(), "1000.00");
        assert_eq!(summary.expense.to_string(), "-20.00");
        assert_eq!(summary.net.to_string(), "980.00");
    }

    #[test]
    fn test_monthly_summary_zero_counts_as_income() {
        let ledger = ledger_of(vec![tx("2024-03-05", "Gift", 0)]);
        let summary = ledger.monthly_summary("2024-03").unwrap();
        assert_eq!(summary.income, Amount::ZERO);
        assert_eq!(summary.expense, Amount::ZERO);
    }

    #[test]
    fn test_monthly_summary_rejects_bad_format() {
        let ledger = Ledger::new();
        for bad in ["2024-3", "2024/03", "2024-03-01", ""] {
            let err = ledger.monthly_summary(bad).unwrap_err();
            assert!(matches!(err, LedgerError::InvalidFormat { .. }), "{}", bad);
        }
    }

    #[test]
    fn test_search_by_category_substring() {
        let ledger = ledger_of(vec![
            tx("2024-01-01", "FoodCourt", -1),
            tx("2024-01-02", "Rent", -2),
            tx("2024-01-03", "Fast Food", -3),
            tx("2024-01-04", "food", -4),
        ]);

        let hits = ledger.search(SearchMode::CategorySubstring, "Food").unwrap();
        let positions: Vec<_> = hits.iter().map(|(i, _)| *i).collect();
        assert_eq!(positions, vec![0, 2]);
    }

    #[test]
    fn test_search_by_date() {
        let ledger = ledger_of(vec![
            tx("2024-01-01", "A", 1),
            tx("2024-01-02", "B", 2),
            tx("2024-01-01", "C", 3),
        ]);

        let hits = ledger.search(SearchMode::ExactDate, "2024-01-01").unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].0, 2);

        let none = ledger.search(SearchMode::ExactDate, "2024-05-05").unwrap();
        assert!(none.is_empty());

        let err = ledger.search(SearchMode::ExactDate, "2024-1-1").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidFormat { .. }));
    }

    #[test]
    fn test_sort_is_stable() {
        let mut ledger = ledger_of(vec![
            tx("2024-02-01", "first", 5),
            tx("2024-01-01", "second", 5),
            tx("2024-03-01", "third", -1),
        ]);

        ledger.sort(SortKey::Amount);
        let order: Vec<_> = ledger.list().map(|(_, t)| t.category()).collect();
        assert_eq!(order, vec!["third", "first", "second"]);

        ledger.sort(SortKey::Date);
        let order: Vec<_> = ledger.list().map(|(_, t)| t.category()).collect();
        assert_eq!(order, vec!["second", "first", "third"]);
    }

    #[test]
    fn test_budget_add_then_update_keeps_position() {
        let mut ledger = Ledger::new();
        assert_eq!(
            ledger.add_or_update_budget("Food", Amount::from(100)).unwrap(),
            BudgetChange::Added
        );
        ledger.add_or_update_budget("Rent", Amount::from(900)).unwrap();
        assert_eq!(
            ledger.add_or_update_budget(" Food ", Amount::from(50)).unwrap(),
            BudgetChange::Updated
        );

        let budgets: Vec<_> = ledger
            .budgets()
            .map(|b| (b.category().to_string(), b.limit()))
            .collect();
        assert_eq!(
            budgets,
            vec![
                ("Food".to_string(), Amount::from(50)),
                ("Rent".to_string(), Amount::from(900)),
            ]
        );
    }

    #[test]
    fn test_budget_category_is_case_sensitive() {
        let mut ledger = Ledger::new();
        ledger.add_or_update_budget("Food", Amount::from(1)).unwrap();
        ledger.add_or_update_budget("food", Amount::from(2)).unwrap();
        assert_eq!(ledger.budgets().count(), 2);
    }

    #[test]
    fn test_budget_validation() {
        let mut ledger = Ledger::new();
        assert!(matches!(
            ledger.add_or_update_budget("  ", Amount::from(1)),
            Err(LedgerError::EmptyCategory)
        ));
        assert!(matches!(
            ledger.add_or_update_budget("Food", Amount::from(-1)),
            Err(LedgerError::NegativeLimit(_))
        ));
        assert!(ledger.add_or_update_budget("Food", Amount::ZERO).is_ok());
    }

    #[test]
    fn test_check_budgets() {
        let mut ledger = ledger_of(vec![
            tx("2024-03-05", "Food", -12),
            tx("2024-03-06", "Food", -8),
            tx("2024-03-07", "Food", 30),
            tx("2024-03-08", "Rent", -900),
        ]);
        ledger.add_or_update_budget("Food", Amount::from(15)).unwrap();
        ledger.add_or_update_budget("Travel", Amount::from(100)).unwrap();

        let statuses = ledger.check_budgets().unwrap();
        assert_eq!(statuses.len(), 2);

        assert_eq!(statuses[0].category, "Food");
        assert_eq!(statuses[0].spent.to_string(), "20.00");
        assert_eq!(statuses[0].limit.to_string(), "15.00");
        assert!(statuses[0].exceeded);

        assert_eq!(statuses[1].category, "Travel");
        assert_eq!(statuses[1].spent, Amount::ZERO);
        assert!(!statuses[1].exceeded);
    }

    #[test]
    fn test_check_budgets_without_budgets() {
        let ledger = ledger_of(vec![tx("2024-03-05", "Food", -12)]);
        assert!(matches!(
            ledger.check_budgets(),
            Err(LedgerError::NoBudgetsDefined)
        ));
    }

    #[test]
    fn test_write_format() {
        let mut ledger = Ledger::new();
        ledger.add(Transaction::new(
            "2024-03-05",
            "Food",
            Amount::from_str("-20.50").unwrap(),
            "lunch, with Sam",
        ));
        ledger.add(Transaction::new("2024-03-10", "Salary", Amount::from(1000), ""));

        let mut output = Vec::new();
        assert_eq!(ledger.write_to(&mut output).unwrap(), 2);

        let output = String::from_utf8(output).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(
            lines,
            vec!["2024-03-05,Food,-20.5,lunch; with Sam", "2024-03-10,Salary,1000,"]
        );
    }

    #[test]
    fn test_read_keeps_commas_in_description() {
        let data = "2024-03-05, Food ,-20,lunch, with Sam\n";
        let mut ledger = Ledger::new();
        let report = ledger.read_from(Cursor::new(data)).unwrap();

        assert_eq!(report.loaded, 1);
        let t = ledger.get(0).unwrap();
        assert_eq!(t.category(), "Food");
        assert_eq!(t.description(), "lunch, with Sam");
    }

    #[test]
    fn test_read_skips_bad_lines() {
        let data = "2024-03-05,Food,-20,a\n\
                    2024-13-05,Food,-20,b\n\
                    2024-03-06,Food,abc,c\n\
                    2024-03-07,Food,5,d\n";
        let mut ledger = Ledger::new();
        let report = ledger.read_from(Cursor::new(data)).unwrap();

        assert_eq!(report.loaded, 2);
        assert_eq!(
            report.skipped,
            vec![
                SkippedRow {
                    line: 2,
                    reason: SkipReason::InvalidDate("2024-13-05".to_string()),
                },
                SkippedRow {
                    line: 3,
                    reason: SkipReason::InvalidAmount("abc".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_read_keeps_bare_carriage_return_in_description() {
        let mut ledger = Ledger::new();
        let report = ledger
            .read_from(Cursor::new("2024-03-05,Food,-20,a\rb\n"))
            .unwrap();

        assert_eq!(report.loaded, 1);
        assert!(report.skipped.is_empty());
        assert_eq!(ledger.get(0).unwrap().description(), "a\rb");
    }

    #[test]
    fn test_read_strips_crlf_line_endings() {
        let data = "2024-03-05,Food,-20,lunch\r\n2024-03-06,Food,-3\r\n";
        let mut ledger = Ledger::new();
        let report = ledger.read_from(Cursor::new(data)).unwrap();

        assert_eq!(report.loaded, 2);
        assert_eq!(ledger.get(0).unwrap().description(), "lunch");
        assert_eq!(ledger.get(1).unwrap().amount(), Amount::from(-3));
        assert_eq!(ledger.get(1).unwrap().description(), "");
    }

    #[test]
    fn test_read_replaces_existing() {
        let mut ledger = ledger_of(vec![tx("2020-01-01", "Old", 1)]);
        ledger
            .read_from(Cursor::new("2024-03-05,New,2,\n"))
            .unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(0).unwrap().category(), "New");
    }

    #[test]
    fn test_load_missing_file_leaves_ledger() {
        let mut ledger = ledger_of(vec![tx("2020-01-01", "Old", 1)]);
        let err = ledger
            .load_from("/nonexistent/dir/ledger.csv")
            .unwrap_err();
        assert!(matches!(err, LedgerError::FileRead { .. }));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_save_to_unwritable_path() {
        let ledger = ledger_of(vec![tx("2020-01-01", "Old", 1)]);
        let err = ledger.save_to("/nonexistent/dir/ledger.csv").unwrap_err();
        assert!(matches!(err, LedgerError::FileWrite { .. }));
    }
}
