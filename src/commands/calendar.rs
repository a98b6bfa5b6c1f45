use chrono::{Local, NaiveDate, TimeZone};
use clap::Args;
use ptrainer_core::calendar::events;
use ptrainer_core::{agenda, Api, CalendarEvent, CalendarView, Transport};
use serde::Serialize;

use super::OutputFormat;

#[derive(Args)]
pub struct CalendarCommand {
    /// month, week or day
    #[arg(long, default_value = "month")]
    view: CalendarView,

    /// Day to show the view around, YYYY-MM-DD (default: today)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Serialize)]
struct Day<'a> {
    date: NaiveDate,
    events: Vec<&'a CalendarEvent>,
}

fn heading(view: CalendarView, anchor: NaiveDate) -> String {
    let (first, last) = view.range(anchor);
    match view {
        CalendarView::Month => anchor.format("%B %Y").to_string(),
        CalendarView::Week => format!(
            "Week {} - {}",
            first.format("%d.%m."),
            last.pred_opt().unwrap_or(last).format("%d.%m.%Y")
        ),
        CalendarView::Day => first.format("%A %d.%m.%Y").to_string(),
    }
}

fn render<Tz: TimeZone>(
    view: CalendarView,
    anchor: NaiveDate,
    days: &[(NaiveDate, Vec<&CalendarEvent>)],
    tz: &Tz,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    let title = heading(view, anchor);
    out.push_str(&format!("{}\n{}\n", title, "=".repeat(title.chars().count())));

    if days.is_empty() {
        out.push_str("\nNo trainings\n");
        return out;
    }

    for (day, events) in days {
        out.push_str(&format!("\n{}\n", day.format("%a %d.%m.%Y")));
        for event in events {
            out.push_str(&format!(
                "  {}-{}  {}\n",
                event.start.with_timezone(tz).format("%H:%M"),
                event.end.with_timezone(tz).format("%H:%M"),
                event.title
            ));
        }
    }
    out
}

impl CalendarCommand {
    pub async fn run<C>(&self, api: &Api<C>) -> Result<(), Box<dyn std::error::Error>>
    where
        C: Transport + Clone,
    {
        let anchor = self.date.unwrap_or_else(|| Local::now().date_naive());
        let trainings = api.training_feed().await?;
        let all = events(&trainings);
        let days = agenda(&all, self.view, anchor, &Local);

        match self.format {
            OutputFormat::Json => {
                let days: Vec<Day> = days
                    .into_iter()
                    .map(|(date, events)| Day { date, events })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&days)?);
            }
            OutputFormat::Text => {
                print!("{}", render(self.view, anchor, &days, &Local));
            }
        }
        Ok(())
    }
}
