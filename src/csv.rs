use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::model::{Command, Destination, limits};
use crate::tariff::{CostOverflow, RuleError};
use crate::{Amount, Exchange};

/// Errors that can occur when parsing csv rows
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open csv file: {0}")]
    Open(#[source] csv::Error),

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized command type '{kind}'")]
    UnrecognizedType { line: usize, kind: String },

    #[error("line {line}: {kind} missing {field}")]
    MissingField {
        line: usize,
        kind: String,
        field: &'static str,
    },

    #[error("line {line}: {field} {value} out of range")]
    OutOfRange {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: {source}")]
    Destination { line: usize, source: RuleError },

    #[error("failed to write report: {0}")]
    Write(#[from] csv::Error),

    #[error("failed to write report: {0}")]
    Cost(#[from] CostOverflow),
}

#[derive(Debug, Deserialize)]
struct InputRow {
    r#type: String,
    client: Option<String>,
    destination: Option<String>,
    minutes: Option<u32>,
    price: Option<f64>,
    discount: Option<f64>,
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    client: &'a str,
    calls: usize,
    unpriced: usize,
    total: String,
}

/// Read commands from a csv file
pub fn read_commands(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<Command, CsvError>>, CsvError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(CsvError::Open)?;
    Ok(parse_rows(reader))
}

fn parse_rows<R: io::Read>(
    reader: csv::Reader<R>,
) -> impl Iterator<Item = Result<Command, CsvError>> {
    reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            row.into_command(line)
        })
}

impl InputRow {
    fn into_command(self, line: usize) -> Result<Command, CsvError> {
        let kind = self.r#type.to_ascii_lowercase();
        let missing = |field| CsvError::MissingField {
            line,
            kind: kind.clone(),
            field,
        };

        match kind.as_str() {
            "tariff" => {
                let destination = self.destination(line, &kind)?;
                let price = self.price.ok_or_else(|| missing("price"))?;
                check_price(line, price)?;
                Ok(Command::SetTariff { destination, price })
            }
            "benefit" => {
                let destination = self.destination(line, &kind)?;
                let price = self.price.ok_or_else(|| missing("price"))?;
                let discount = self.discount.ok_or_else(|| missing("discount"))?;
                check_price(line, price)?;
                if !limits::DISCOUNT_PERCENT.contains(&discount) {
                    return Err(CsvError::OutOfRange {
                        line,
                        field: "discount",
                        value: discount.to_string(),
                    });
                }
                Ok(Command::SetBenefitTariff {
                    destination,
                    price,
                    discount,
                })
            }
            "client" => {
                let last_name = self.client.ok_or_else(|| missing("client"))?;
                Ok(Command::AddClient { last_name })
            }
            "call" => {
                let destination = self.destination(line, &kind)?;
                let minutes = self.minutes.ok_or_else(|| missing("minutes"))?;
                if !limits::CALL_MINUTES.contains(&minutes) {
                    return Err(CsvError::OutOfRange {
                        line,
                        field: "minutes",
                        value: minutes.to_string(),
                    });
                }
                let last_name = self.client.ok_or_else(|| missing("client"))?;
                Ok(Command::RegisterCall {
                    last_name,
                    destination,
                    minutes,
                })
            }
            _ => Err(CsvError::UnrecognizedType {
                line,
                kind: self.r#type,
            }),
        }
    }

    fn destination(&self, line: usize, kind: &str) -> Result<Destination, CsvError> {
        let raw = self
            .destination
            .as_deref()
            .ok_or_else(|| CsvError::MissingField {
                line,
                kind: kind.to_string(),
                field: "destination",
            })?;
        Destination::from_selection(raw).map_err(|source| CsvError::Destination { line, source })
    }
}

fn check_price(line: usize, price: f64) -> Result<(), CsvError> {
    if limits::is_valid_price(price) {
        Ok(())
    } else {
        Err(CsvError::OutOfRange {
            line,
            field: "price",
            value: price.to_string(),
        })
    }
}

/// Write the per-client cost report in csv format, in registration order
pub fn write_report(exchange: &Exchange, writer: impl io::Write) -> Result<(), CsvError> {
    let mut writer = csv::Writer::from_writer(writer);
    let tariffs = exchange.tariffs();

    for client in exchange.clients() {
        let total: Amount = client.total_cost(tariffs)?;
        writer.serialize(OutputRow {
            client: client.last_name(),
            calls: client.calls().len(),
            unpriced: client.unpriced_calls(tariffs),
            total: total.to_string(),
        })?;
    }

    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::City;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "type,client,destination,minutes,price,discount\n";

    fn write_csv(rows: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        file.write_all(rows.as_bytes()).unwrap();
        file
    }

    fn read(rows: &str) -> Vec<Result<Command, CsvError>> {
        let file = write_csv(rows);
        read_commands(file.path()).unwrap().collect()
    }

    #[test]
    fn read_tariff() {
        let results = read("tariff,,Minsk,,0.5,\n");
        assert_eq!(results.len(), 1);

        match results.into_iter().next().unwrap().unwrap() {
            Command::SetTariff { destination, price } => {
                assert_eq!(destination, Destination::City(City::Minsk));
                assert_eq!(price, 0.5);
            }
            other => panic!("expected tariff, got {other:?}"),
        }
    }

    #[test]
    fn read_benefit_with_city_index() {
        let results = read("benefit,,4,,1.8,15\n");

        match results.into_iter().next().unwrap().unwrap() {
            Command::SetBenefitTariff {
                destination,
                price,
                discount,
            } => {
                assert_eq!(destination, Destination::City(City::Brest));
                assert_eq!(price, 1.8);
                assert_eq!(discount, 15.0);
            }
            other => panic!("expected benefit, got {other:?}"),
        }
    }

    #[test]
    fn read_client_and_call() {
        let results = read("client,Ivanov,,,,\ncall,Ivanov,Saint-Petersburg,12,,\n");
        assert_eq!(results.len(), 2);

        assert!(matches!(
            &results[0],
            Ok(Command::AddClient { last_name }) if last_name == "Ivanov"
        ));
        match &results[1] {
            Ok(Command::RegisterCall {
                last_name,
                destination,
                minutes,
            }) => {
                assert_eq!(last_name, "Ivanov");
                assert_eq!(destination.to_string(), "Saint-Petersburg");
                assert_eq!(*minutes, 12);
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn read_with_whitespace_and_case() {
        let results = read(" CALL , Ivanov , gomel , 5 , , \n");
        assert!(matches!(
            &results[0],
            Ok(Command::RegisterCall { destination: Destination::City(City::Gomel), .. })
        ));
    }

    #[test]
    fn read_returns_error_for_unknown_type() {
        let results = read("refund,Ivanov,,,,\n");
        let err = results[0].as_ref().unwrap_err();
        assert!(matches!(err, CsvError::UnrecognizedType { line: 2, .. }));
    }

    #[test]
    fn read_returns_error_for_missing_fields() {
        let results = read("tariff,,Minsk,,,\nclient,,,,,\ncall,Ivanov,Minsk,,,\n");
        assert!(matches!(
            results[0].as_ref().unwrap_err(),
            CsvError::MissingField { line: 2, field: "price", .. }
        ));
        assert!(matches!(
            results[1].as_ref().unwrap_err(),
            CsvError::MissingField { line: 3, field: "client", .. }
        ));
        assert!(matches!(
            results[2].as_ref().unwrap_err(),
            CsvError::MissingField { line: 4, field: "minutes", .. }
        ));
    }

    #[test]
    fn read_returns_error_for_out_of_range_values() {
        let results =
            read("tariff,,Minsk,,1000.5,\nbenefit,,Minsk,,1,100\ncall,Ivanov,Minsk,1441,,\n");
        for (result, field) in results.iter().zip(["price", "discount", "minutes"]) {
            match result {
                Err(CsvError::OutOfRange { field: f, .. }) => assert_eq!(*f, field),
                other => panic!("expected out of range {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn read_rejects_prices_outside_money_range() {
        let results = read("tariff,,Minsk,,0.00004,\ntariff,,Minsk,,1e15,\ntariff,,Minsk,,0.0001,\n");
        for result in &results[..2] {
            assert!(matches!(
                result,
                Err(CsvError::OutOfRange { field: "price", .. })
            ));
        }
        assert!(matches!(
            &results[2],
            Ok(Command::SetTariff { price, .. }) if *price == 0.0001
        ));
    }

    #[test]
    fn read_returns_error_for_invalid_destination() {
        let results = read("tariff,,Minsk2,,0.5,\ntariff,,7,,0.5,\n");
        assert!(matches!(
            results[0].as_ref().unwrap_err(),
            CsvError::Destination {
                line: 2,
                source: RuleError::InvalidDestination(_)
            }
        ));
        assert!(matches!(
            results[1].as_ref().unwrap_err(),
            CsvError::Destination { line: 3, .. }
        ));
    }

    #[test]
    fn read_returns_error_for_unparseable_row() {
        let results = read("call,Ivanov,Minsk,ten,,\n");
        assert!(matches!(
            results[0].as_ref().unwrap_err(),
            CsvError::Parse { line: 2, .. }
        ));
    }

    #[test]
    fn open_missing_file_fails() {
        let result = read_commands("/nonexistent/commands.csv");
        assert!(matches!(result, Err(CsvError::Open(_))));
    }

    #[test]
    fn write_report_lists_clients_in_order() {
        let mut exchange = Exchange::new();
        exchange.tariffs_mut().set_tariff(City::Minsk.into(), 0.5).unwrap();
        exchange.add_client("Petrov");
        exchange.add_client("Ivanov");
        exchange.register_call("Ivanov", City::Minsk.into(), 10);
        exchange.register_call("Ivanov", City::Grodno.into(), 3);

        let mut out = Vec::new();
        write_report(&exchange, &mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out,
            "client,calls,unpriced,total\nPetrov,0,0,0.00\nIvanov,2,1,5.00\n"
        );
    }
}
