use crate::commands::open_engine;
use crate::config::CliConfig;
use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};
use fairdraw_core::types::canonical_numbers;
use fairdraw_core::{audit_record, BetType, DrawRecord, Result};
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum DrawCommands {
    /// Commit to a seed, derive the numbers and sign them
    Create {
        /// Bet type (2D, 3D, 4D, 2D-FRONT, 2D-MIDDLE, 2D-BACK)
        #[arg(short, long, default_value = "4D")]
        bet_type: String,
        /// Write the full draw record as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the seed as well; by default it stays sealed until reveal
        #[arg(long)]
        show_seed: bool,
    },
    /// Mark a draw record as completed so its seed can be revealed
    Complete {
        /// Draw record JSON file, updated in place
        file: PathBuf,
    },
    /// Re-check a revealed draw record
    Audit {
        /// Draw record JSON file
        file: PathBuf,
    },
}

pub async fn handle_draw_command(cmd: DrawCommands, config: &CliConfig) -> Result<()> {
    match cmd {
        DrawCommands::Create {
            bet_type,
            output,
            show_seed,
        } => {
            let bet_type: BetType = bet_type.parse()?;
            let (engine, _store, _passphrase) = open_engine(config).await?;

            let record = engine.create_draw(bet_type)?;
            let txid = engine.transaction_id()?;

            let mut rows = vec![
                ("Draw ID", record.draw_id.to_string()),
                ("Reference", txid),
                ("Bet type", record.bet_type.to_string()),
                ("Numbers", canonical_numbers(&record.numbers)),
            ];
            if record.bet_type.is_derived() {
                rows.push(("Winning", canonical_numbers(record.winning_numbers())));
            }
            rows.extend([
                ("Commitment", record.commitment.clone()),
                ("Key", engine.fingerprint()),
                ("Created", record.created_at.to_rfc3339()),
            ]);
            if show_seed {
                rows.push(("Seed", record.seed.clone()));
            }

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["Field", "Value"]);
            for (field, value) in rows {
                table.add_row(vec![field.to_string(), value]);
            }
            println!("{table}");

            if let Some(path) = output {
                write_record(&path, &record).await?;
                println!("Draw record written to: {}", path.display());
            } else if !show_seed {
                println!("The seed was not saved; pass --output to keep the record for the reveal");
            }
        }

        DrawCommands::Complete { file } => {
            let mut record = read_record(&file).await?;
            let (engine, _store, _passphrase) = open_engine(config).await?;

            let already = record.completed;
            engine.complete_draw(&mut record)?;
            write_record(&file, &record).await?;

            if already {
                println!("Draw {} was already completed.", record.draw_id);
            } else {
                println!("Draw {} completed. The seed may now be revealed:", record.draw_id);
                println!("{}", record.seed);
            }
        }

        DrawCommands::Audit { file } => {
            let record = read_record(&file).await?;
            let audit = audit_record(&record);

            let verdict = |ok: bool| if ok { "PASS" } else { "FAIL" };

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["Check", "Result"]);
            table.add_row(vec!["Seed matches commitment", verdict(audit.commitment_valid)]);
            table.add_row(vec!["Numbers derive from seed", verdict(audit.numbers_match)]);
            table.add_row(vec!["Signature", verdict(audit.signature_valid)]);

            println!("Draw {} ({})", record.draw_id, record.bet_type);
            println!("Numbers: {}", canonical_numbers(&record.numbers));
            if record.bet_type.is_derived() {
                println!("Winning: {}", canonical_numbers(record.winning_numbers()));
            }
            println!("Status:  {}", if record.completed { "completed" } else { "open" });
            println!("{table}");

            tracing::info!(
                "Audited draw {} from {}: {}",
                record.draw_id,
                file.display(),
                if audit.is_valid() { "valid" } else { "invalid" }
            );

            if !audit.is_valid() {
                println!("Draw record FAILED verification.");
                std::process::exit(2);
            }
            println!("Draw record verified.");
        }
    }

    Ok(())
}

async fn read_record(path: &Path) -> Result<DrawRecord> {
    let json = tokio::fs::read_to_string(path).await?;
    let record: DrawRecord = serde_json::from_str(&json)?;
    tracing::debug!("Loaded draw {} from {}", record.draw_id, path.display());
    Ok(record)
}

async fn write_record(path: &Path, record: &DrawRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    tokio::fs::write(path, json).await?;
    tracing::info!("Wrote draw {} to {}", record.draw_id, path.display());
    Ok(())
}
