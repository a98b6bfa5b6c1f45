use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use clap::{Args, Subcommand, ValueEnum};
use ptrainer_core::view::TRAINING_SEARCH_FIELDS;
use ptrainer_core::{Activity, Api, Customer, Entity, ListView, SortOrder, Training, Transport};

use super::{confirm, display_id, truncate, OutputFormat};

#[derive(Clone, Copy, ValueEnum)]
pub enum TrainingSort {
    Date,
    Activity,
    Duration,
    Customer,
}

impl TrainingSort {
    fn field(self) -> &'static str {
        match self {
            TrainingSort::Date => "date",
            TrainingSort::Activity => "activity",
            TrainingSort::Duration => "duration",
            TrainingSort::Customer => "customer",
        }
    }
}

#[derive(Args)]
pub struct TrainingCommand {
    #[command(subcommand)]
    pub command: TrainingSubcommand,
}

#[derive(Subcommand)]
pub enum TrainingSubcommand {
    /// List trainings with their customers
    List {
        /// Only show trainings whose customer or activity contains this text
        #[arg(long, short)]
        search: Option<String>,

        /// Sort by a column
        #[arg(long, value_enum)]
        sort: Option<TrainingSort>,

        /// Sort in descending order
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Book a training for a customer
    Add {
        /// Customer id or self link
        #[arg(long)]
        customer: String,

        /// Yoga, Running, Swimming, Gym, Cycling or Boxing
        #[arg(long, short)]
        activity: String,

        /// Duration in minutes
        #[arg(long, short)]
        duration: u32,

        /// Local start time, YYYY-MM-DDTHH:MM or YYYY-MM-DD (default: now)
        #[arg(long)]
        date: Option<String>,
    },

    /// Update an existing training
    Update {
        /// Training id or self link
        identifier: String,

        /// Move the training to another customer (id or self link)
        #[arg(long)]
        customer: Option<String>,

        #[arg(long, short)]
        activity: Option<String>,

        /// Duration in minutes
        #[arg(long, short)]
        duration: Option<u32>,

        /// Local start time, YYYY-MM-DDTHH:MM or YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete a training
    Delete {
        /// Training id or self link
        identifier: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

/// Parses a local wall-clock time; a bare date means midnight.
pub fn parse_local_datetime<Tz: TimeZone>(
    input: &str,
    tz: &Tz,
) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    let input = input.trim();
    let naive = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN))
        })
        .map_err(|_| {
            format!(
                "Invalid date '{}'. Use YYYY-MM-DDTHH:MM or YYYY-MM-DD",
                input
            )
        })?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| format!("'{}' does not exist in the local time zone", input).into())
}

/// `DD.MM.YYYY HH:mm` in the given zone.
pub fn format_local<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant.with_timezone(tz).format("%d.%m.%Y %H:%M").to_string()
}

fn parse_activity(input: &str) -> Result<Activity, Box<dyn std::error::Error>> {
    Ok(input.parse::<Activity>()?)
}

fn validate_duration(duration: u32) -> Result<u32, Box<dyn std::error::Error>> {
    if duration == 0 {
        return Err("Duration must be at least 1 minute".into());
    }
    Ok(duration)
}

/// Resolves a customer identifier to the customer's self link.
async fn customer_href<C>(api: &Api<C>, identifier: &str) -> Result<String, Box<dyn std::error::Error>>
where
    C: Transport + Clone,
{
    let mut customers = api.customers()?;
    customers.load().await?;
    let customer = customers
        .find(identifier)
        .ok_or_else(|| format!("Customer not found: {}", identifier))?;
    customer
        .self_href()
        .map(str::to_string)
        .ok_or_else(|| format!("Customer {} has no self link", identifier).into())
}

impl TrainingCommand {
    pub async fn run<C>(&self, api: &Api<C>) -> Result<(), Box<dyn std::error::Error>>
    where
        C: Transport + Clone,
    {
        match &self.command {
            TrainingSubcommand::List {
                search,
                sort,
                desc,
                format,
            } => {
                let trainings = api.training_feed().await?;

                let mut view = ListView::new();
                if let Some(query) = search {
                    view = view.search_any(query.as_str(), TRAINING_SEARCH_FIELDS);
                }
                if let Some(sort) = sort {
                    let order = if *desc {
                        SortOrder::Descending
                    } else {
                        SortOrder::Ascending
                    };
                    view = view.sort_by(sort.field(), order);
                }

                let visible = view.apply(&trainings);
                if visible.is_empty() {
                    println!("No trainings found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&visible)?);
                    }
                    OutputFormat::Text => {
                        println!(
                            "{:<6}  {:<16}  {:<10}  {:>8}  CUSTOMER",
                            "ID", "DATE", "ACTIVITY", "DURATION"
                        );
                        println!("{}", "-".repeat(72));
                        for training in &visible {
                            let t = &training.fields;
                            println!(
                                "{:<6}  {:<16}  {:<10}  {:>4} min  {}",
                                display_id(training),
                                format_local(&t.date, &Local),
                                truncate(&t.activity, 10),
                                t.duration,
                                t.customer_name()
                            );
                        }
                        println!("\nTotal: {} training(s)", visible.len());
                    }
                }
                Ok(())
            }

            TrainingSubcommand::Add {
                customer,
                activity,
                duration,
                date,
            } => {
                let activity = parse_activity(activity)?;
                let duration = validate_duration(*duration)?;
                let date = match date {
                    Some(input) => parse_local_datetime(input, &Local)?,
                    None => Utc::now(),
                };
                let href = customer_href(api, customer).await?;

                let draft = Training::new(date, activity.as_str(), duration).for_customer(href);
                let mut trainings = api.trainings()?;
                let mut created = trainings.create(&draft).await?.clone();
                api.attach_customer(&mut created).await?;

                println!("Created training:");
                print_training(&created);
                Ok(())
            }

            TrainingSubcommand::Update {
                identifier,
                customer,
                activity,
                duration,
                date,
            } => {
                if customer.is_none() && activity.is_none() && duration.is_none() && date.is_none() {
                    return Err("Nothing to update. Provide at least one option.".into());
                }

                let mut trainings = api.trainings()?;
                trainings.load().await?;
                let mut training = trainings
                    .find(identifier)
                    .cloned()
                    .ok_or_else(|| format!("Training not found: {}", identifier))?;

                if let Some(activity) = activity {
                    training.fields.activity = parse_activity(activity)?.as_str().to_string();
                }
                if let Some(duration) = duration {
                    training.fields.duration = validate_duration(*duration)?;
                }
                if let Some(date) = date {
                    training.fields.date = parse_local_datetime(date, &Local)?;
                }

                // A full replace must name the customer again, otherwise the
                // booking loses it.
                let href = match customer {
                    Some(identifier) => Some(customer_href(api, identifier).await?),
                    None => match training.link("customer") {
                        Some(link) => {
                            let current: Entity<Customer> = api.follow(link).await?;
                            current.self_href().map(str::to_string)
                        }
                        None => None,
                    },
                };
                if let Some(href) = href {
                    training.fields = training.fields.for_customer(href);
                }

                trainings.update(&training).await?;
                api.attach_customer(&mut training).await?;
                println!("Updated training:");
                print_training(&training);
                Ok(())
            }

            TrainingSubcommand::Delete { identifier, force } => {
                let mut trainings = api.trainings()?;
                trainings.load().await?;
                let training = trainings
                    .find(identifier)
                    .cloned()
                    .ok_or_else(|| format!("Training not found: {}", identifier))?;

                let label = format!(
                    "{} on {}",
                    training.fields.activity,
                    format_local(&training.fields.date, &Local)
                );
                if !force && !confirm(&format!("Delete training '{}'?", label))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                trainings.remove(&training).await?;
                println!("Deleted training: {}", label);
                Ok(())
            }
        }
    }
}

fn print_training(training: &Entity<Training>) {
    let t = &training.fields;
    println!("{}", t.activity);
    println!("{}", "=".repeat(t.activity.chars().count()));
    println!("Date: {}", format_local(&t.date, &Local));
    println!("Duration: {} min", t.duration);
    println!("Customer: {}", t.customer_name());
}
