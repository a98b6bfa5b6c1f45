use clap::Args;
use ptrainer_core::{Api, Transport};

use super::confirm;

#[derive(Args)]
pub struct ResetCommand {
    /// Skip confirmation prompt
    #[arg(long, short)]
    force: bool,
}

impl ResetCommand {
    pub async fn run<C>(&self, api: &Api<C>) -> Result<(), Box<dyn std::error::Error>>
    where
        C: Transport + Clone,
    {
        if !self.force && !confirm("Reset all customers and trainings to the demo data?")? {
            println!("Reset cancelled.");
            return Ok(());
        }

        api.reset().await?;

        let mut customers = api.customers()?;
        let count = customers.load().await?.len();
        println!("Demo data restored: {} customer(s)", count);
        Ok(())
    }
}
