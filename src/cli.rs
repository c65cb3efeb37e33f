use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lavka")]
#[command(author, version, about = "Telegram e-commerce bot with cart, payments, and product recommendations", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Print the generated demo catalog and exit
    SeedInfo,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
