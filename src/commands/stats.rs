use clap::Args;
use ptrainer_core::{activity_totals, bar_chart, Api, Transport};

use super::OutputFormat;

const CHART_WIDTH: usize = 40;

#[derive(Args)]
pub struct StatsCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl StatsCommand {
    pub async fn run<C>(&self, api: &Api<C>) -> Result<(), Box<dyn std::error::Error>>
    where
        C: Transport + Clone,
    {
        let trainings = api.training_feed().await?;
        let totals = activity_totals(&trainings);

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&totals)?);
            }
            OutputFormat::Text => {
                if totals.is_empty() {
                    println!("No trainings found");
                    return Ok(());
                }
                println!("Minutes per activity");
                println!("====================\n");
                print!("{}", bar_chart(&totals, CHART_WIDTH));
            }
        }
        Ok(())
    }
}
