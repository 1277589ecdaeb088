use std::io::{self, Write};

use anyhow::{Context, Result};
use stationctl_core::{EmployeeView, Position, SortOrder, Station, Store};

const SEPARATOR: &str = "----------------------";

pub async fn run_display_stations(store: &Store, sort: SortOrder) -> Result<()> {
    let stations = store.stations().list(sort).await.context("failed to list stations")?;
    write_stations(&mut io::stdout().lock(), &stations)?;
    Ok(())
}

pub async fn run_display_positions(
    store: &Store,
    sort: SortOrder,
    tax_percent: Option<u8>,
) -> Result<()> {
    let positions = store.positions().list(sort).await.context("failed to list positions")?;
    write_positions(&mut io::stdout().lock(), &positions, tax_percent)?;
    Ok(())
}

pub async fn run_display_employees(store: &Store, sort: SortOrder) -> Result<()> {
    let employees = store.employees().list(sort).await.context("failed to list employees")?;
    write_employees(&mut io::stdout().lock(), &employees)?;
    Ok(())
}

fn write_stations(out: &mut impl Write, stations: &[Station]) -> io::Result<()> {
    for station in stations {
        writeln!(out, "ID: {}", station.id)?;
        writeln!(out, "Title: {}", station.title)?;
        writeln!(out, "City: {}", station.city)?;
        writeln!(out, "Address: {}", station.address)?;
        writeln!(out, "{}", SEPARATOR)?;
    }
    Ok(())
}

fn write_positions(
    out: &mut impl Write,
    positions: &[Position],
    tax_percent: Option<u8>,
) -> io::Result<()> {
    for position in positions {
        writeln!(out, "ID: {}", position.id)?;
        writeln!(out, "Title: {}", position.title)?;
        writeln!(out, "Introduced: {}", position.add_date)?;
        match tax_percent {
            Some(percent) if percent > 0 => writeln!(
                out,
                "Salary: {:.2} RUB ({} before {}% tax)",
                position.net_salary(percent),
                position.salary,
                percent
            )?,
            _ => writeln!(out, "Salary: {} RUB", position.salary)?,
        }
        writeln!(out, "{}", SEPARATOR)?;
    }
    Ok(())
}

fn write_employees(out: &mut impl Write, employees: &[EmployeeView]) -> io::Result<()> {
    for employee in employees {
        writeln!(out, "ID: {}", employee.id)?;
        writeln!(out, "Full name: {}", employee.full_name)?;
        writeln!(
            out,
            "Position: {}",
            employee.position_title.as_deref().unwrap_or_default()
        )?;
        writeln!(
            out,
            "Station: {}",
            employee.station_title.as_deref().unwrap_or_default()
        )?;
        writeln!(out, "Start date: {}", employee.start_date)?;
        writeln!(out, "{}", SEPARATOR)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn positions_with_tax_deduction() {
        let positions = vec![Position {
            id: 1,
            title: "Guard".to_string(),
            add_date: "2015-04-01".to_string(),
            salary: 40_000,
        }];

        let plain = render(|out| write_positions(out, &positions, None));
        assert!(plain.contains("Salary: 40000 RUB\n"));

        let taxed = render(|out| write_positions(out, &positions, Some(13)));
        assert!(taxed.contains("Salary: 34800.00 RUB (40000 before 13% tax)"));
    }

    #[test]
    fn employee_without_station_shows_blank_title() {
        let employees = vec![EmployeeView {
            id: 7,
            full_name: "Kovalenko A.".to_string(),
            start_date: "2020-02-03".to_string(),
            station_id: None,
            position_id: 1,
            position_title: Some("Guard".to_string()),
            station_title: None,
        }];

        let text = render(|out| write_employees(out, &employees));
        assert!(text.contains("Position: Guard\n"));
        assert!(text.contains("Station: \n"));
        assert!(text.ends_with(&format!("{}\n", SEPARATOR)));
    }

    #[test]
    fn stations_render_every_field() {
        let stations = vec![Station {
            id: 3,
            title: "Airport".to_string(),
            city: "Minsk".to_string(),
            address: "Terminal 2".to_string(),
        }];

        let text = render(|out| write_stations(out, &stations));
        assert_eq!(
            text,
            "ID: 3\nTitle: Airport\nCity: Minsk\nAddress: Terminal 2\n----------------------\n"
        );
    }
}
