//! CSV export of the customer list.

use std::io::{self, Write};

use crate::models::{Customer, Entity};

pub const CUSTOMER_CSV_HEADERS: [&str; 4] = ["First Name", "Last Name", "Email", "Phone"];

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn write_row<W: Write>(out: &mut W, values: &[&str]) -> io::Result<()> {
    let row: Vec<String> = values.iter().map(|v| quote(v)).collect();
    writeln!(out, "{}", row.join(","))
}

/// Writes customers as CSV with every value quoted.
pub fn write_customers_csv<'a, W, I>(out: &mut W, customers: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Entity<Customer>>,
{
    write_row(out, &CUSTOMER_CSV_HEADERS)?;
    for customer in customers {
        let c = &customer.fields;
        write_row(
            out,
            &[
                c.firstname.as_str(),
                c.lastname.as_str(),
                c.email.as_str(),
                c.phone.as_str(),
            ],
        )?;
    }
    Ok(())
}

pub fn customers_csv<'a, I>(customers: I) -> String
where
    I: IntoIterator<Item = &'a Entity<Customer>>,
{
    let mut buf = Vec::new();
    // writing into a Vec cannot fail
    let _ = write_customers_csv(&mut buf, customers);
    String::from_utf8_lossy(&buf).into_owned()
}
