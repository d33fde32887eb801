//! Forward vols and an event split from a small strip of ATM quotes.
//!
//! Demonstrates:
//!   1. Forward vol between two expiries
//!   2. The full forward vol matrix over a strip
//!   3. Splitting an expiry's vol around an earnings date
//!   4. Rescaling a quote from calendar-day to trading-day basis
//!
//! Run with: `cargo run --example forward_vols`

use volterm::VarianceTermStructure;
use volterm::conventions::{DayCountBasis, convert_vol_basis};
use volterm::event::{CalendarModel, EventDecomposer};
use volterm::matrix::ForwardVolMatrixBuilder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let trade_date = "2024-03-01";

    // ---------------------------------------------------------------
    // 1. Forward vol between two quotes
    // ---------------------------------------------------------------

    let ts = VarianceTermStructure::new(trade_date)?;
    let fwd = ts.forward_vol(40.0, "2024-03-21", 42.0, "2024-03-31")?;
    println!("Forward vol 2024-03-21 -> 2024-03-31: {:.2}%", fwd.to_pct());

    // ---------------------------------------------------------------
    // 2. Forward vol matrix
    // ---------------------------------------------------------------

    let matrix = ForwardVolMatrixBuilder::new()
        .trade_date(trade_date)
        .add_expiries([
            ("2024-03-21", 40.0),
            ("2024-03-31", 42.0),
            ("2024-04-30", 44.0),
            ("2024-05-31", 46.0),
        ])
        .build()?;

    let labels = matrix.labels();
    println!("\nForward vol matrix (from row to column):");
    print!("{:>12}", "");
    for label in &labels {
        print!("{label:>12}");
    }
    println!();
    for (i, row) in matrix.rows().iter().enumerate() {
        print!("{:>12}", labels[i]);
        for cell in row {
            match cell {
                Some(vol) => print!("{:>11.2}%", vol.to_pct()),
                None => print!("{:>12}", "-"),
            }
        }
        println!();
    }

    // ---------------------------------------------------------------
    // 3. Event decomposition
    // ---------------------------------------------------------------

    let model: CalendarModel = "skewed_diffusion:0.85".parse()?;
    let split = EventDecomposer::new().decompose(
        trade_date,
        "2024-03-21", // expiry
        "2024-03-10", // earnings
        40.0,
        3.0,
        &model,
    )?;
    let report = split.to_report();
    println!(
        "\nEvent split ({}): pre {:.2}% ({}d), event {:.2}%, post {:.2}% ({}d)",
        split.model,
        report.pre_event_vol,
        report.days_to_event,
        report.event_vol,
        report.post_event_vol,
        report.days_after_event
    );

    // ---------------------------------------------------------------
    // 4. Basis conversion
    // ---------------------------------------------------------------

    let trading = convert_vol_basis(40.0, DayCountBasis::Calendar365, DayCountBasis::Trading252)?;
    println!("\n40.00% on 365-day basis = {trading:.2}% on 252-day basis");

    Ok(())
}
