use clap::{Args, Subcommand, ValueEnum};
use ptrainer_core::export::write_customers_csv;
use ptrainer_core::view::CUSTOMER_SEARCH_FIELDS;
use ptrainer_core::{Api, Customer, ListView, SortOrder, Transport};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use super::{confirm, display_id, truncate, OutputFormat};

#[derive(Clone, Copy, ValueEnum)]
pub enum CustomerSort {
    Firstname,
    Lastname,
    Email,
    Phone,
}

impl CustomerSort {
    fn field(self) -> &'static str {
        match self {
            CustomerSort::Firstname => "firstname",
            CustomerSort::Lastname => "lastname",
            CustomerSort::Email => "email",
            CustomerSort::Phone => "phone",
        }
    }
}

/// Customer fields accepted by `add` and `update`.
#[derive(Args, Default)]
pub struct CustomerFields {
    #[arg(long)]
    firstname: Option<String>,

    #[arg(long)]
    lastname: Option<String>,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    phone: Option<String>,

    /// Street address
    #[arg(long = "street")]
    streetaddress: Option<String>,

    #[arg(long)]
    postcode: Option<String>,

    #[arg(long)]
    city: Option<String>,
}

impl CustomerFields {
    fn is_empty(&self) -> bool {
        self.firstname.is_none()
            && self.lastname.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.streetaddress.is_none()
            && self.postcode.is_none()
            && self.city.is_none()
    }

    /// Overwrites the fields that were given on the command line.
    fn apply(&self, customer: &mut Customer) {
        let pairs = [
            (&self.firstname, &mut customer.firstname),
            (&self.lastname, &mut customer.lastname),
            (&self.email, &mut customer.email),
            (&self.phone, &mut customer.phone),
            (&self.streetaddress, &mut customer.streetaddress),
            (&self.postcode, &mut customer.postcode),
            (&self.city, &mut customer.city),
        ];
        for (given, field) in pairs {
            if let Some(value) = given {
                *field = value.trim().to_string();
            }
        }
    }
}

fn validate(customer: &Customer) -> Result<(), Box<dyn std::error::Error>> {
    let missing = customer.missing_required();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("Missing required fields: {}", missing.join(", ")).into())
    }
}

#[derive(Args)]
pub struct CustomerCommand {
    #[command(subcommand)]
    pub command: CustomerSubcommand,
}

#[derive(Subcommand)]
pub enum CustomerSubcommand {
    /// List customers
    List {
        /// Only show customers whose name or email contains this text
        #[arg(long, short)]
        search: Option<String>,

        /// Sort by a column
        #[arg(long, value_enum)]
        sort: Option<CustomerSort>,

        /// Sort in descending order
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a new customer
    Add(CustomerFields),

    /// Update an existing customer
    Update {
        /// Customer id or self link
        identifier: String,

        #[command(flatten)]
        fields: CustomerFields,
    },

    /// Delete a customer
    Delete {
        /// Customer id or self link
        identifier: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Export customers as CSV
    Export {
        /// Output file, or - for stdout
        #[arg(long, short, default_value = "customers.csv")]
        output: PathBuf,

        /// Only export customers whose name or email contains this text
        #[arg(long, short)]
        search: Option<String>,
    },
}

impl CustomerCommand {
    pub async fn run<C>(&self, api: &Api<C>) -> Result<(), Box<dyn std::error::Error>>
    where
        C: Transport + Clone,
    {
        let mut customers = api.customers()?;

        match &self.command {
            CustomerSubcommand::List {
                search,
                sort,
                desc,
                format,
            } => {
                customers.load().await?;

                let mut view = ListView::new();
                if let Some(query) = search {
                    view = view.search(query.as_str(), CUSTOMER_SEARCH_FIELDS);
                }
                if let Some(sort) = sort {
                    let order = if *desc {
                        SortOrder::Descending
                    } else {
                        SortOrder::Ascending
                    };
                    view = view.sort_by(sort.field(), order);
                }

                let visible = view.apply(customers.items());
                if visible.is_empty() {
                    println!("No customers found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&visible)?);
                    }
                    OutputFormat::Text => {
                        println!(
                            "{:<6}  {:<24}  {:<28}  {:<14}  CITY",
                            "ID", "NAME", "EMAIL", "PHONE"
                        );
                        println!("{}", "-".repeat(84));
                        for customer in &visible {
                            let c = &customer.fields;
                            println!(
                                "{:<6}  {:<24}  {:<28}  {:<14}  {}",
                                display_id(customer),
                                truncate(&c.full_name(), 24),
                                truncate(&c.email, 28),
                                truncate(&c.phone, 14),
                                c.city
                            );
                        }
                        println!("\nTotal: {} customer(s)", visible.len());
                    }
                }
                Ok(())
            }

            CustomerSubcommand::Add(fields) => {
                let mut customer = Customer::default();
                fields.apply(&mut customer);
                validate(&customer)?;

                let created = customers.create(&customer).await?;
                println!("Created customer:");
                println!("{}", created.fields);
                Ok(())
            }

            CustomerSubcommand::Update { identifier, fields } => {
                if fields.is_empty() {
                    return Err("Nothing to update. Provide at least one option.".into());
                }

                customers.load().await?;
                let mut customer = customers
                    .find(identifier)
                    .cloned()
                    .ok_or_else(|| format!("Customer not found: {}", identifier))?;

                fields.apply(&mut customer.fields);
                validate(&customer.fields)?;

                customers.update(&customer).await?;
                println!("Updated customer:");
                println!("{}", customer.fields);
                Ok(())
            }

            CustomerSubcommand::Delete { identifier, force } => {
                customers.load().await?;
                let customer = customers
                    .find(identifier)
                    .cloned()
                    .ok_or_else(|| format!("Customer not found: {}", identifier))?;

                let name = customer.fields.full_name();
                if !force && !confirm(&format!("Delete customer '{}'?", name))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                customers.remove(&customer).await?;
                println!("Deleted customer: {}", name);
                Ok(())
            }

            CustomerSubcommand::Export { output, search } => {
                customers.load().await?;

                let mut view = ListView::new();
                if let Some(query) = search {
                    view = view.search(query.as_str(), CUSTOMER_SEARCH_FIELDS);
                }
                let visible = view.apply(customers.items());

                if output.as_os_str() == "-" {
                    let stdout = io::stdout();
                    let mut out = stdout.lock();
                    write_customers_csv(&mut out, visible.iter().copied())?;
                    out.flush()?;
                } else {
                    let mut out = BufWriter::new(File::create(output)?);
                    write_customers_csv(&mut out, visible.iter().copied())?;
                    out.flush()?;
                    println!(
                        "Exported {} customer(s) to {}",
                        visible.len(),
                        output.display()
                    );
                }
                Ok(())
            }
        }
    }
}
