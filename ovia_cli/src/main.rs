use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use ovia_core::dates::parse_calendar_date;
use ovia_core::export::write_calendar_csv;
use ovia_core::service;
use ovia_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ovia")]
#[command(about = "Menstrual cycle and pregnancy tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new user and print its id
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,
    },

    /// Cycle tracking
    #[command(subcommand)]
    Cycle(CycleCommand),

    /// Pregnancy tracking
    #[command(subcommand)]
    Pregnancy(PregnancyCommand),
}

#[derive(Subcommand)]
enum CycleCommand {
    /// Save last period date, cycle length and period duration
    Set {
        #[arg(long)]
        user: String,

        /// First day of the last period (YYYY-MM-DD)
        #[arg(long)]
        last_period_date: String,

        #[arg(long, default_value_t = 28)]
        cycle_length: u32,

        #[arg(long, default_value_t = 5)]
        period_duration: u32,
    },

    /// Show the projected calendar and today's phase as JSON
    Show {
        #[arg(long)]
        user: String,

        #[command(flatten)]
        today: TodayArg,
    },

    /// Write the projected calendar to a CSV file
    Export {
        #[arg(long)]
        user: String,

        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum PregnancyCommand {
    /// Save pregnancy data from weeks pregnant, due date or LMP
    Set {
        #[arg(long)]
        user: String,

        #[arg(long)]
        weeks: Option<u32>,

        /// Expected due date (YYYY-MM-DD)
        #[arg(long)]
        due_date: Option<String>,

        /// Last menstrual period (YYYY-MM-DD)
        #[arg(long)]
        lmp: Option<String>,

        #[command(flatten)]
        today: TodayArg,
    },

    /// Show pregnancy progress as JSON
    Show {
        #[arg(long)]
        user: String,

        #[command(flatten)]
        today: TodayArg,
    },

    /// Mark the pregnancy as ended
    Clear {
        #[arg(long)]
        user: String,
    },
}

#[derive(Args)]
struct TodayArg {
    /// Evaluate as of this date instead of today (YYYY-MM-DD)
    #[arg(long)]
    today: Option<String>,
}

impl TodayArg {
    fn resolve(&self) -> Result<NaiveDate> {
        match &self.today {
            Some(s) => parse_calendar_date(s),
            None => Ok(dates::calendar_day(chrono::Utc::now())),
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    ovia_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    let store = FileProfileStore::new(&data_dir);

    match cli.command {
        Commands::Register { name, email } => {
            let user_id = service::register_user(&store, &name, &email, chrono::Utc::now())?;
            println!("{}", user_id);
            Ok(())
        }
        Commands::Cycle(cmd) => cmd_cycle(&store, cmd, &config.engine),
        Commands::Pregnancy(cmd) => cmd_pregnancy(&store, cmd, &config.engine),
    }
}

fn cmd_cycle(store: &FileProfileStore, cmd: CycleCommand, cfg: &EngineConfig) -> Result<()> {
    match cmd {
        CycleCommand::Set {
            user,
            last_period_date,
            cycle_length,
            period_duration,
        } => {
            let profile = CycleProfile::new(
                parse_calendar_date(&last_period_date)?,
                cycle_length,
                period_duration,
            )?;
            service::save_cycle_profile(store, &user, &profile)?;
            println!("✓ Cycle data saved");
            Ok(())
        }
        CycleCommand::Show { user, today } => {
            let response = service::cycle_projection(store, &user, today.resolve()?, cfg)?;
            print_json(&response)
        }
        CycleCommand::Export { user, out } => {
            let profile = service::load_cycle_profile(store, &user, cfg)?;
            let cycles = project_cycles(&profile, cfg)?;

            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::File::create(&out)?;
            let rows = write_calendar_csv(&cycles, file)?;

            println!("✓ Exported {} calendar days", rows);
            println!("  CSV: {}", out.display());
            Ok(())
        }
    }
}

fn cmd_pregnancy(
    store: &FileProfileStore,
    cmd: PregnancyCommand,
    cfg: &EngineConfig,
) -> Result<()> {
    match cmd {
        PregnancyCommand::Set {
            user,
            weeks,
            due_date,
            lmp,
            today,
        } => {
            let input = PregnancyInput {
                weeks_pregnant: weeks,
                due_date: due_date.as_deref().map(parse_calendar_date).transpose()?,
                lmp: lmp.as_deref().map(parse_calendar_date).transpose()?,
            };
            let payload = service::save_pregnancy(store, &user, &input, today.resolve()?, cfg)?;
            print_json(&payload)
        }
        PregnancyCommand::Show { user, today } => {
            let response = service::pregnancy_status(store, &user, today.resolve()?, cfg)?;
            print_json(&response)
        }
        PregnancyCommand::Clear { user } => {
            service::clear_pregnancy(store, &user)?;
            println!("✓ Pregnancy cleared");
            Ok(())
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
