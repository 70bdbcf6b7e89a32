use std::io::Write;
use std::path::Path;

use csv::Writer;
use serde::Serialize;

use crate::disc::multi_domain::Field;
use crate::error::SpectralError;
use crate::history::StateHistory;

#[derive(Serialize)]
struct NodalRecord {
    time: f64,
    domain: usize,
    field: &'static str,
    x: f64,
    value: f64,
}

#[derive(Serialize)]
struct ModalRecord {
    time: f64,
    domain: usize,
    field: &'static str,
    mode: usize,
    coefficient: f64,
}

/// Steps written for a dump interval: every `interval`-th step plus the last.
fn dumped_steps(len: usize, interval: usize) -> impl Iterator<Item = usize> {
    let interval = interval.max(1);
    (0..len).filter(move |&step| step % interval == 0 || step + 1 == len)
}

/// One row per node, field and dumped snapshot; `x` is the global coordinate.
pub fn write_nodal_csv<W: Write>(
    history: &StateHistory,
    interval: usize,
    writer: &mut Writer<W>,
) -> Result<(), SpectralError> {
    let layout = history.layout();
    for step in dumped_steps(history.len(), interval) {
        let snapshot = history.snapshot(step)?;
        for (domain, fields) in snapshot.fields.iter().enumerate() {
            for field in Field::ALL {
                let function = &fields[field.index()];
                let points = &function.basis().cell_gauss_points;
                for (&x, &value) in points.iter().zip(function.collocation_data().iter()) {
                    writer.serialize(NodalRecord {
                        time: snapshot.time,
                        domain,
                        field: field.name(),
                        x: layout.global_coordinate(domain, x),
                        value,
                    })?;
                }
            }
        }
    }
    writer.flush()?;
    Ok(())
}

/// Legendre coefficients of every field over time.
pub fn write_modal_csv<W: Write>(
    history: &StateHistory,
    interval: usize,
    writer: &mut Writer<W>,
) -> Result<(), SpectralError> {
    for step in dumped_steps(history.len(), interval) {
        let snapshot = history.snapshot(step)?;
        for (domain, fields) in snapshot.fields.iter().enumerate() {
            for field in Field::ALL {
                let coefficients = fields[field.index()].project_to_modal_coefficients();
                for (mode, &coefficient) in coefficients.iter().enumerate() {
                    writer.serialize(ModalRecord {
                        time: snapshot.time,
                        domain,
                        field: field.name(),
                        mode,
                        coefficient,
                    })?;
                }
            }
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn write_to_csv<P: AsRef<Path>>(
    history: &StateHistory,
    interval: usize,
    output_dir: P,
) -> Result<(), SpectralError> {
    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir)?;
    let mut nodal = Writer::from_path(output_dir.join("nodal.csv"))?;
    write_nodal_csv(history, interval, &mut nodal)?;
    let mut modal = Writer::from_path(output_dir.join("modal.csv"))?;
    write_modal_csv(history, interval, &mut modal)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::basis::lagrange1d::LagrangeBasis1D;
    use crate::disc::gauss_points::NodeFamily;
    use crate::disc::multi_domain::DomainLayout;
    use crate::history::HistoryRecorder;
    use std::rc::Rc;

    fn history() -> StateHistory {
        let basis = Rc::new(LagrangeBasis1D::new(3, NodeFamily::GaussLobatto).unwrap());
        let layout = DomainLayout::new(vec![basis.clone(), basis]).unwrap();
        let mut history = StateHistory::new(layout.clone());
        for step in 0..5 {
            let t = step as f64;
            let state = layout.fill_state(|field, x| match field {
                Field::Pi => t,
                Field::Psi => x,
            });
            history.record(t, state.view()).unwrap();
        }
        history
    }

    fn rows(bytes: Vec<u8>) -> Vec<Vec<String>> {
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        reader
            .records()
            .map(|record| record.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_dumped_steps() {
        assert_eq!(dumped_steps(5, 2).collect::<Vec<_>>(), vec![0, 2, 4]);
        assert_eq!(dumped_steps(6, 4).collect::<Vec<_>>(), vec![0, 4, 5]);
        assert_eq!(dumped_steps(3, 0).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_nodal_rows() {
        let history = history();
        let mut writer = Writer::from_writer(Vec::new());
        write_nodal_csv(&history, 2, &mut writer).unwrap();
        let bytes = writer.into_inner().unwrap();
        let header = String::from_utf8(bytes.clone()).unwrap();
        assert!(header.starts_with("time,domain,field,x,value"));
        let rows = rows(bytes);
        // 3 snapshots x 2 domains x 2 fields x 3 nodes
        assert_eq!(rows.len(), 36);
        assert_eq!(rows[0], vec!["0.0", "0", "pi", "-1.0", "0.0"]);
        let last = &rows[35];
        assert_eq!(last[1], "1");
        assert_eq!(last[2], "psi");
        assert_eq!(last[3].parse::<f64>().unwrap(), 3.0);
    }

    #[test]
    fn test_modal_rows() {
        let history = history();
        let mut writer = Writer::from_writer(Vec::new());
        write_modal_csv(&history, 10, &mut writer).unwrap();
        let rows = rows(writer.into_inner().unwrap());
        // first and last snapshot
        assert_eq!(rows.len(), 2 * 2 * 2 * 3);
        let pi_mean = rows
            .iter()
            .find(|row| row[0] == "4.0" && row[2] == "pi" && row[3] == "0")
            .unwrap();
        assert!((pi_mean[4].parse::<f64>().unwrap() - 4.0).abs() < 1e-12);
    }
}
