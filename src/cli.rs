//! The command-line presentation layer.
//!
//! Each subcommand mirrors one page of the tracker: the dashboard, the
//! operations browser, analytics, reports, login, and settings. Every
//! invocation is a single synchronous request/response against the data
//! manager; a failed call surfaces its error once and the invocation aborts.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use numfmt::{Formatter, Precision};
use prettytable::{Table, row};
use time::{Date, macros::format_description};

use spendly::{
    Error,
    balance::{self, MonthlyTotals, Summary},
    config::{self, AppConfig, Currency, Overrides, StorageKind},
    export,
    filter::OperationFilter,
    import,
    manager::DataManager,
    models::{DatabaseId, Transaction, TransactionDraft, TransactionKind},
    session::Session,
    stores::{JsonFileStore, RemoteStore, SqliteStore, TransactionStore},
};

/// A personal finance tracker: record income and expenses, view balances,
/// and browse aggregate reports.
#[derive(Parser, Debug)]
#[command(name = "spendly", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    options: Options,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Options {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    config: Option<String>,

    /// Override the storage backend: file, sqlite, or api.
    #[arg(long, global = true)]
    backend: Option<StorageKind>,

    /// Override the JSON data file path (file backend).
    #[arg(long, global = true)]
    data_path: Option<String>,

    /// Override the SQLite database path (sqlite backend).
    #[arg(long, global = true)]
    db_path: Option<String>,

    /// Override the remote API base URL (api backend).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Override the display currency: usd, eur, or mad.
    #[arg(long, global = true)]
    currency: Option<Currency>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the current balance, summary figures, and recent activity.
    Dash {
        /// How many recent operations to show.
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// Browse and manage operations.
    Ops {
        #[command(subcommand)]
        command: OpsCommand,
    },

    /// Category breakdowns, monthly trends, and the balance over time.
    Analytics,

    /// Summary statistics and data export.
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },

    /// Import operations from a CSV bank statement.
    Import {
        /// Path of the CSV file to import.
        file: PathBuf,
    },

    /// Log in to the remote API and save the session.
    Login {
        /// The email address to authenticate with.
        #[arg(long)]
        email: String,
    },

    /// Delete the saved remote session.
    Logout,

    /// Show the active configuration and session.
    Settings,

    /// Delete every stored operation.
    Reset {
        /// Confirm the reset; without this flag nothing is deleted.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum OpsCommand {
    /// List operations, optionally filtered.
    List {
        /// Keep operations on or after this date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        from: Option<Date>,

        /// Keep operations on or before this date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        to: Option<Date>,

        /// Keep only operations of this kind: income or expense.
        #[arg(long)]
        kind: Option<TransactionKind>,

        /// Keep only operations with this category.
        #[arg(long)]
        category: Option<String>,

        /// Keep only operations whose description contains this text.
        #[arg(long)]
        search: Option<String>,
    },

    /// Record a new operation.
    Add {
        /// What the operation was for.
        #[arg(long, default_value = "")]
        description: String,

        /// The non-negative amount.
        #[arg(long)]
        amount: f64,

        /// income or expense.
        #[arg(long)]
        kind: TransactionKind,

        /// The category label, e.g. Food or Salary.
        #[arg(long)]
        category: String,

        /// The operation date (YYYY-MM-DD); defaults to today.
        #[arg(long, value_parser = parse_date)]
        date: Option<Date>,
    },

    /// Delete an operation by its id.
    Delete {
        /// The id shown by `ops list`.
        id: DatabaseId,
    },
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Show total income, total expenses, net balance, and the record count.
    Summary,

    /// Export all operations as CSV.
    Export {
        /// Write to this file instead of standard output.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn parse_date(text: &str) -> Result<Date, String> {
    Date::parse(text, &format_description!("[year]-[month]-[day]"))
        .map_err(|error| format!("expected YYYY-MM-DD: {error}"))
}

/// Parse the command line, load the configuration, and run the requested
/// command.
pub fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    let settings = config::load(Overrides {
        config: cli.options.config,
        backend: cli.options.backend,
        data_path: cli.options.data_path,
        db_path: cli.options.db_path,
        api_url: cli.options.api_url,
        currency: cli.options.currency,
    })?;

    match cli.command {
        Command::Login { email } => login(&settings, &email),
        Command::Logout => logout(&settings),
        Command::Settings => show_settings(&settings),
        command => {
            let (store, symbol) = build_store(&settings)?;
            let mut manager = DataManager::new(store);

            dispatch(command, &mut manager, &symbol)
        }
    }
}

/// Build the backend the configuration selects, along with the currency
/// symbol to display amounts in.
fn build_store(settings: &AppConfig) -> Result<(Box<dyn TransactionStore>, String), Error> {
    let symbol = settings.currency.symbol().to_string();

    match settings.backend {
        StorageKind::File => Ok((
            Box::new(JsonFileStore::open(&settings.data_path)),
            symbol,
        )),
        StorageKind::Sqlite => Ok((
            Box::new(SqliteStore::open(Path::new(&settings.db_path))?),
            symbol,
        )),
        StorageKind::Api => {
            let mut store = RemoteStore::new(&settings.api_url)?;
            let mut symbol = symbol;

            if let Some(session) = Session::load(Path::new(&settings.session_path)) {
                symbol = session.currency.clone();
                store = store.with_session(session);
            }

            Ok((Box::new(store), symbol))
        }
    }
}

fn dispatch(
    command: Command,
    manager: &mut DataManager<Box<dyn TransactionStore>>,
    symbol: &str,
) -> Result<(), Error> {
    match command {
        Command::Dash { limit } => dash(manager, symbol, limit),
        Command::Ops { command } => match command {
            OpsCommand::List {
                from,
                to,
                kind,
                category,
                search,
            } => {
                let filter = OperationFilter {
                    date_range: date_range(from, to),
                    kind,
                    category,
                    search,
                };
                list_operations(manager, symbol, &filter)
            }
            OpsCommand::Add {
                description,
                amount,
                kind,
                category,
                date,
            } => add_operation(manager, description, amount, kind, category, date),
            OpsCommand::Delete { id } => {
                manager.delete_operation(id)?;
                println!("Deleted operation {id}.");
                Ok(())
            }
        },
        Command::Analytics => analytics(manager, symbol),
        Command::Report { command } => match command {
            ReportCommand::Summary => {
                print_summary(&balance::summarize(&manager.operations()?), symbol);
                Ok(())
            }
            ReportCommand::Export { output } => export_report(manager, output),
        },
        Command::Import { file } => import_statement(manager, &file),
        Command::Reset { yes } => reset(manager, yes),
        // Handled before a store is built.
        Command::Login { .. } | Command::Logout | Command::Settings => unreachable!(),
    }
}

fn date_range(from: Option<Date>, to: Option<Date>) -> Option<std::ops::RangeInclusive<Date>> {
    match (from, to) {
        (None, None) => None,
        (from, to) => Some(from.unwrap_or(Date::MIN)..=to.unwrap_or(Date::MAX)),
    }
}

fn dash(
    manager: &DataManager<Box<dyn TransactionStore>>,
    symbol: &str,
    limit: usize,
) -> Result<(), Error> {
    let operations = manager.operations()?;

    println!(
        "Current balance: {}",
        format_amount(symbol, balance::total_balance(&operations))
    );
    println!();

    print_summary(&balance::summarize(&operations), symbol);

    let mut recent = operations;
    recent.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    recent.truncate(limit);

    println!();
    println!("Recent activity");
    print_operations(&recent, symbol);

    Ok(())
}

fn list_operations(
    manager: &DataManager<Box<dyn TransactionStore>>,
    symbol: &str,
    filter: &OperationFilter,
) -> Result<(), Error> {
    let mut operations = filter.apply(manager.operations()?);
    operations.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

    print_operations(&operations, symbol);
    println!("{} operation(s)", operations.len());

    Ok(())
}

fn add_operation(
    manager: &mut DataManager<Box<dyn TransactionStore>>,
    description: String,
    amount: f64,
    kind: TransactionKind,
    category: String,
    date: Option<Date>,
) -> Result<(), Error> {
    let mut draft = TransactionDraft::new(amount, kind)?
        .description(description)
        .category(category);

    if let Some(date) = date {
        draft = draft.date(date);
    }

    let added = manager.add_operation(draft)?;
    println!("Added operation {}.", added.id);

    Ok(())
}

fn analytics(
    manager: &DataManager<Box<dyn TransactionStore>>,
    symbol: &str,
) -> Result<(), Error> {
    let operations = manager.operations()?;

    println!("Expenses by category");
    let mut by_category: Vec<(String, f64)> = balance::expense_category_totals(&operations)
        .into_iter()
        .collect();
    by_category.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut table = Table::new();
    table.add_row(row!["Category", "Spent"]);
    for (category, spent) in by_category {
        table.add_row(row![category, format_amount(symbol, spent)]);
    }
    table.printstd();

    println!();
    println!("Monthly income vs expenses");
    let mut by_month: Vec<(Date, MonthlyTotals)> =
        balance::monthly_totals(&operations).into_iter().collect();
    by_month.sort_by_key(|(month, _)| *month);

    let mut table = Table::new();
    table.add_row(row!["Month", "Income", "Expenses"]);
    for (month, totals) in by_month {
        table.add_row(row![
            format_month(month),
            format_amount(symbol, totals.income),
            format_amount(symbol, totals.expenses)
        ]);
    }
    table.printstd();

    println!();
    println!("Balance over time");
    let mut table = Table::new();
    table.add_row(row!["Date", "Balance"]);
    for (date, running) in balance::running_balance(&operations) {
        table.add_row(row![date, format_amount(symbol, running)]);
    }
    table.printstd();

    Ok(())
}

fn export_report(
    manager: &DataManager<Box<dyn TransactionStore>>,
    output: Option<PathBuf>,
) -> Result<(), Error> {
    let operations = manager.operations()?;

    match output {
        Some(path) => {
            let csv = export::to_csv_string(&operations)?;
            fs::write(&path, csv)?;
            println!(
                "Exported {} operation(s) to {}.",
                operations.len(),
                path.display()
            );
        }
        None => export::write_operations(std::io::stdout(), &operations)?,
    }

    Ok(())
}

fn import_statement(
    manager: &mut DataManager<Box<dyn TransactionStore>>,
    file: &Path,
) -> Result<(), Error> {
    let text = fs::read_to_string(file)?;
    let drafts = import::parse_statement(&text)?;
    let imported = manager.import_operations(drafts)?;

    println!("Imported {} operation(s).", imported.len());

    Ok(())
}

fn reset(manager: &mut DataManager<Box<dyn TransactionStore>>, yes: bool) -> Result<(), Error> {
    if !yes {
        println!("This deletes every stored operation. Re-run with --yes to confirm.");
        return Ok(());
    }

    manager.clear_all()?;
    println!("All data has been reset.");

    Ok(())
}

fn login(settings: &AppConfig, email: &str) -> Result<(), Error> {
    let mut store = RemoteStore::new(&settings.api_url)?;
    let password = rpassword::prompt_password("Password: ")?;

    let session = store.login(email, &password)?;
    session.save(Path::new(&settings.session_path))?;

    println!(
        "Logged in. Amounts will be shown in {}.",
        session.currency
    );

    Ok(())
}

fn logout(settings: &AppConfig) -> Result<(), Error> {
    Session::clear(Path::new(&settings.session_path))?;
    println!("Logged out.");

    Ok(())
}

fn show_settings(settings: &AppConfig) -> Result<(), Error> {
    let mut table = Table::new();
    table.add_row(row!["Backend", settings.backend]);
    table.add_row(row!["Data file", settings.data_path]);
    table.add_row(row!["Database", settings.db_path]);
    table.add_row(row!["API URL", settings.api_url]);
    table.add_row(row!["Currency", settings.currency]);

    let session = match Session::load(Path::new(&settings.session_path)) {
        Some(session) => format!("logged in (user {})", session.user_id),
        None => "logged out".to_string(),
    };
    table.add_row(row!["Session", session]);

    table.printstd();

    Ok(())
}

fn print_summary(summary: &Summary, symbol: &str) {
    let mut table = Table::new();
    table.add_row(row!["Total Income", format_amount(symbol, summary.total_income)]);
    table.add_row(row![
        "Total Expenses",
        format_amount(symbol, summary.total_expenses)
    ]);
    table.add_row(row!["Net Balance", format_amount(symbol, summary.net_balance)]);
    table.add_row(row!["Transactions", summary.count]);
    table.printstd();
}

fn print_operations(operations: &[Transaction], symbol: &str) {
    let mut table = Table::new();
    table.add_row(row!["Id", "Date", "Description", "Amount", "Type", "Category"]);

    for operation in operations {
        table.add_row(row![
            operation.id,
            operation.date,
            operation.description,
            format_amount(symbol, operation.signed_amount()),
            operation.kind,
            operation.category
        ]);
    }

    table.printstd();
}

fn format_month(month: Date) -> String {
    format!("{}-{:02}", month.year(), month.month() as u8)
}

/// Format an amount with the currency symbol, thousands separators, and two
/// decimals, e.g. `€1,234.50` or `-€40.00`.
fn format_amount(symbol: &str, number: f64) -> String {
    // Zero is hardcoded because numfmt renders it as a bare "0".
    if number == 0.0 {
        return format!("{symbol}0.00");
    }

    let prefix = if number < 0.0 {
        format!("-{symbol}")
    } else {
        symbol.to_string()
    };

    let formatter = match Formatter::currency(&prefix) {
        Ok(formatter) => formatter.precision(Precision::Decimals(2)),
        Err(_) => return format!("{prefix}{:.2}", number.abs()),
    };

    let mut formatted = formatter.fmt_string(number.abs());

    // numfmt omits the last trailing zero, so we must add it ourselves.
    // For example, "12.30" is rendered as "12.3" so we append "0".
    if formatted.as_bytes()[formatted.len() - 3] != b'.' {
        formatted = format!("{formatted}0");
    }

    formatted
}

#[cfg(test)]
mod format_amount_tests {
    use super::format_amount;

    #[test]
    fn formats_positive_amounts_with_two_decimals() {
        assert_eq!(format_amount("€", 1234.5), "€1,234.50");
        assert_eq!(format_amount("$", 12.34), "$12.34");
    }

    #[test]
    fn formats_negative_amounts_with_a_leading_minus() {
        assert_eq!(format_amount("€", -40.0), "-€40.00");
    }

    #[test]
    fn formats_zero_explicitly() {
        assert_eq!(format_amount("DH", 0.0), "DH0.00");
    }
}

#[cfg(test)]
mod date_range_tests {
    use time::{Date, macros::date};

    use super::date_range;

    #[test]
    fn no_bounds_means_no_range() {
        assert_eq!(date_range(None, None), None);
    }

    #[test]
    fn open_ends_extend_to_the_date_limits() {
        let range = date_range(Some(date!(2024 - 01 - 01)), None).unwrap();

        assert_eq!(*range.start(), date!(2024 - 01 - 01));
        assert_eq!(*range.end(), Date::MAX);
    }
}
