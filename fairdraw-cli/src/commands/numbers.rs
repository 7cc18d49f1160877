use clap::{Args, Subcommand};
use fairdraw_core::types::canonical_numbers;
use fairdraw_core::{derive_numbers, generate_secure_numbers, Result};

#[derive(Args)]
pub struct RangeArgs {
    /// How many numbers to produce
    #[arg(short = 'n', long, default_value_t = 4)]
    count: usize,
    /// Smallest value
    #[arg(long, default_value_t = 0)]
    min: u32,
    /// Largest value
    #[arg(long, default_value_t = 9)]
    max: u32,
}

#[derive(Subcommand)]
pub enum NumberCommands {
    /// Recompute draw numbers from a revealed seed
    Derive {
        /// Revealed seed
        seed: String,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Fresh random numbers, not reproducible and not provably fair
    Random {
        #[command(flatten)]
        range: RangeArgs,
    },
}

pub fn handle_number_command(cmd: NumberCommands) -> Result<()> {
    let numbers = match cmd {
        NumberCommands::Derive { seed, range } => {
            derive_numbers(&seed, range.count, range.min, range.max)?
        }
        NumberCommands::Random { range } => {
            generate_secure_numbers(range.count, range.min, range.max)?
        }
    };

    println!("{}", canonical_numbers(&numbers));
    Ok(())
}
