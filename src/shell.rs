//! Line-oriented command shell over a [`Ledger`].
//!
//! Each input line is one command. Words are split on whitespace and may be
//! grouped with double quotes, then parsed with `clap`. Every ledger failure
//! is reported on the output and the session continues; only a failing output
//! stream ends it.

use crate::error::{LedgerError, Result};
use crate::ledger::{Ledger, SearchMode, SortKey};
use crate::money::Amount;
use crate::transaction::Transaction;
use crate::BudgetChange;
use clap::{Parser, Subcommand, ValueEnum};
use log::debug;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const TABLE_HEADER: &str = "Idx | Date       | Category        |     Amount | Description";
const TABLE_RULE: &str = "-------------------------------------------------------------------";

/// Settings for a shell session.
#[derive(Debug, Clone)]
pub struct ShellOptions {
    /// Used by `save` and `load` when no path is given.
    pub data_file: PathBuf,

    /// Print `> ` before reading each line.
    pub prompt: bool,
}

impl Default for ShellOptions {
    fn default() -> Self {
        ShellOptions {
            data_file: PathBuf::from("data.csv"),
            prompt: false,
        }
    }
}

/// Whether the session should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Parser, Debug)]
#[command(
    name = "ledger",
    no_binary_name = true,
    disable_version_flag = true,
    color = clap::ColorChoice::Never
)]
struct CommandLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Add a transaction (positive amount is income, negative is expense)
    Add {
        /// Date as YYYY-MM-DD
        date: String,
        /// Category; blank becomes Miscellaneous
        category: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Free-text description
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        description: Vec<String>,
    },
    /// Delete the transaction at an index shown by `list`
    Delete {
        #[arg(allow_hyphen_values = true)]
        index: String,
    },
    /// List all transactions
    List,
    /// Save transactions to a file
    Save { path: Option<PathBuf> },
    /// Load transactions from a file, replacing the current ones
    Load { path: Option<PathBuf> },
    /// Income, expenses and net for a month
    Summary {
        /// Month as YYYY-MM
        year_month: String,
    },
    /// Search transactions
    Search {
        #[command(subcommand)]
        by: SearchBy,
    },
    /// Sort transactions in place
    Sort {
        #[arg(value_enum)]
        key: SortArg,
    },
    /// Manage category budgets
    Budget {
        #[command(subcommand)]
        action: BudgetAction,
    },
    /// End the session
    #[command(alias = "exit")]
    Quit,
}

#[derive(Subcommand, Debug)]
enum SearchBy {
    /// Categories containing the text (case-sensitive)
    Category { query: String },
    /// Transactions on an exact date
    Date { date: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    Date,
    Amount,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Date => SortKey::Date,
            SortArg::Amount => SortKey::Amount,
        }
    }
}

#[derive(Subcommand, Debug)]
enum BudgetAction {
    /// Add a budget or change its limit
    Set {
        category: String,
        #[arg(allow_hyphen_values = true)]
        limit: String,
    },
    /// List budgets
    List,
    /// Compare spending against every budget
    Check,
}

/// An interactive session owning its ledger.
pub struct Shell {
    ledger: Ledger,
    options: ShellOptions,
}

impl Shell {
    pub fn new(ledger: Ledger, options: ShellOptions) -> Self {
        Shell { ledger, options }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Executes commands from `input` until it ends or `quit` is read.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> Result<()> {
        let mut line = String::new();
        loop {
            if self.options.prompt {
                write!(out, "> ")?;
                out.flush()?;
            }

            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }

            if self.execute_line(&line, &mut out)? == Flow::Quit {
                break;
            }
        }

        out.flush()?;
        Ok(())
    }

    /// Parses and executes a single command line.
    pub fn execute_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        let words = match split_words(line) {
            Some(words) => words,
            None => {
                writeln!(out, "Error: unterminated quote")?;
                return Ok(Flow::Continue);
            }
        };
        if words.is_empty() {
            return Ok(Flow::Continue);
        }

        match CommandLine::try_parse_from(&words) {
            Ok(parsed) => self.dispatch(parsed.command, out),
            Err(e) => {
                // Covers `help` as well as usage errors.
                write!(out, "{}", e)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Loads `path` into the ledger and reports the outcome on `out`.
    pub fn load_file<W: Write>(&mut self, path: &Path, out: &mut W) -> Result<()> {
        match self.ledger.load_from(path) {
            Ok(report) => {
                for row in &report.skipped {
                    writeln!(out, "Line {}: {}. Skipping.", row.line, row.reason)?;
                }
                writeln!(out, "File loaded with {} transactions.", report.loaded)?;
            }
            Err(e) => writeln!(out, "Error: {}", e)?,
        }
        Ok(())
    }

    fn dispatch<W: Write>(&mut self, command: ShellCommand, out: &mut W) -> Result<Flow> {
        debug!("Executing {:?}", command);
        match command {
            ShellCommand::Add {
                date,
                category,
                amount,
                description,
            } => {
                match Transaction::from_input(&date, &category, &amount, &description.join(" ")) {
                    Ok(transaction) => {
                        self.ledger.add(transaction);
                        writeln!(out, "Transaction added successfully.")?;
                    }
                    Err(e) => writeln!(out, "Error: {}", e)?,
                }
            }
            ShellCommand::Delete { index } => self.delete(&index, out)?,
            ShellCommand::List => self.list(out)?,
            ShellCommand::Save { path } => {
                let path = path.unwrap_or_else(|| self.options.data_file.clone());
                match self.ledger.save_to(&path) {
                    Ok(_) => writeln!(out, "Data saved to {}", path.display())?,
                    Err(e) => writeln!(out, "Error: {}", e)?,
                }
            }
            ShellCommand::Load { path } => {
                let path = path.unwrap_or_else(|| self.options.data_file.clone());
                self.load_file(&path, out)?;
            }
            ShellCommand::Summary { year_month } => self.summary(&year_month, out)?,
            ShellCommand::Search { by } => self.search(by, out)?,
            ShellCommand::Sort { key } => {
                self.ledger.sort(key.into());
                let name = match key {
                    SortArg::Date => "date",
                    SortArg::Amount => "amount",
                };
                writeln!(out, "Transactions sorted by {} ascending.", name)?;
            }
            ShellCommand::Budget { action } => self.budget(action, out)?,
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn delete<W: Write>(&mut self, index: &str, out: &mut W) -> Result<()> {
        let index: i64 = match index.trim().parse() {
            Ok(i) => i,
            Err(_) => {
                writeln!(out, "Error: invalid index {:?}", index)?;
                return Ok(());
            }
        };

        let result = match usize::try_from(index) {
            Ok(i) => self.ledger.delete_at(i),
            Err(_) => Err(LedgerError::IndexOutOfRange {
                index,
                len: self.ledger.len(),
            }),
        };

        match result {
            Ok(_) => writeln!(out, "Transaction deleted successfully.")?,
            Err(e) => writeln!(out, "Error: {}", e)?,
        }
        Ok(())
    }

    fn list<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.ledger.is_empty() {
            writeln!(out, "No transactions recorded.")?;
            return Ok(());
        }
        write_table(out, self.ledger.list())
    }

    fn summary<W: Write>(&self, year_month: &str, out: &mut W) -> Result<()> {
        match self.ledger.monthly_summary(year_month) {
            Ok(summary) => {
                writeln!(out, "Summary for {}:", year_month)?;
                writeln!(out, "Income:   ${}", summary.income)?;
                writeln!(out, "Expenses: ${}", summary.expense)?;
                writeln!(out, "Net:      ${}", summary.net)?;
            }
            Err(e) => writeln!(out, "Error: {}", e)?,
        }
        Ok(())
    }

    fn search<W: Write>(&self, by: SearchBy, out: &mut W) -> Result<()> {
        let (mode, query, not_found) = match by {
            SearchBy::Category { query } => (
                SearchMode::CategorySubstring,
                query,
                "No transactions found for that category.",
            ),
            SearchBy::Date { date } => (
                SearchMode::ExactDate,
                date,
                "No transactions found on that date.",
            ),
        };

        match self.ledger.search(mode, &query) {
            Ok(hits) if hits.is_empty() => writeln!(out, "{}", not_found)?,
            Ok(hits) => {
                writeln!(out, "Results found:")?;
                write_table(out, hits.into_iter())?;
            }
            Err(e) => writeln!(out, "Error: {}", e)?,
        }
        Ok(())
    }

    fn budget<W: Write>(&mut self, action: BudgetAction, out: &mut W) -> Result<()> {
        match action {
            BudgetAction::Set { category, limit } => {
                let limit = match Amount::from_str(&limit) {
                    Ok(l) => l,
                    Err(_) => {
                        writeln!(out, "Error: {}", LedgerError::InvalidAmount(limit))?;
                        return Ok(());
                    }
                };

                match self.ledger.add_or_update_budget(&category, limit) {
                    Ok(BudgetChange::Added) => {
                        writeln!(out, "Budget added for category '{}'.", category.trim())?
                    }
                    Ok(BudgetChange::Updated) => {
                        writeln!(out, "Budget updated for category '{}'.", category.trim())?
                    }
                    Err(e) => writeln!(out, "Error: {}", e)?,
                }
            }
            BudgetAction::List => {
                let mut budgets = self.ledger.budgets().peekable();
                if budgets.peek().is_none() {
                    writeln!(out, "No budgets defined.")?;
                    return Ok(());
                }

                writeln!(out, "Category           | Limit")?;
                writeln!(out, "----------------------------")?;
                for budget in budgets {
                    writeln!(out, "{:>18} | ${}", budget.category(), budget.limit())?;
                }
            }
            BudgetAction::Check => match self.ledger.check_budgets() {
                Ok(statuses) => {
                    writeln!(out, "Budget check:")?;
                    for status in &statuses {
                        if status.exceeded {
                            writeln!(
                                out,
                                "ALERT! Category '{}' has exceeded the budget! Spent: ${}, Limit: ${}",
                                status.category, status.spent, status.limit
                            )?;
                        } else {
                            writeln!(
                                out,
                                "Category '{}' is within budget. Spent: ${}, Limit: ${}",
                                status.category, status.spent, status.limit
                            )?;
                        }
                    }
                    if statuses.iter().all(|s| !s.exceeded) {
                        writeln!(out, "All budgets are within limits.")?;
                    }
                }
                Err(LedgerError::NoBudgetsDefined) => writeln!(out, "No budgets defined.")?,
                Err(e) => writeln!(out, "Error: {}", e)?,
            },
        }
        Ok(())
    }
}

fn write_table<'a, W, I>(out: &mut W, rows: I) -> Result<()>
where
    W: Write,
    I: Iterator<Item = (usize, &'a Transaction)>,
{
    writeln!(out, "{}", TABLE_HEADER)?;
    writeln!(out, "{}", TABLE_RULE)?;
    for (index, transaction) in rows {
        writeln!(out, "{:>3} | {}", index, transaction)?;
    }
    Ok(())
}

/// Splits a command line into words. Double quotes group words and may
/// produce an empty word. Returns `None` on an unterminated quote.
fn split_words(line: &str) -> Option<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                in_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if in_quotes {
        return None;
    }
    if in_word {
        words.push(current);
    }
    Some(words)
}
