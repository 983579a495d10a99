use crate::attr::{AttrValue, Attributes, get_u32};
use crate::error::Result;
use crate::oms::{OmsApi, PAGE_LIMIT, Query, Record};
use crate::stage::StageExt;
use crate::{dedup_by, filter, inspect, pipe};
use spdlog::{debug, info, warn};

const STABLE_FLAGS: [&str; 3] = ["physics_flag", "beam1_stable", "beam2_stable"];

/// What the user asked to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunSelection {
    Run(u32),
    Fill(u32),
}

/// Turns a selection into the run numbers to process, ascending.
pub fn resolve_runs(api: &mut impl OmsApi, selection: RunSelection) -> Result<Vec<u32>> {
    match selection {
        RunSelection::Run(run) => Ok(vec![run]),
        RunSelection::Fill(fill) => fill_runs(api, fill),
    }
}

/// A lumisection taken with physics declared and both beams stable.
pub fn is_stable_physics(attrs: &Attributes) -> bool {
    STABLE_FLAGS
        .iter()
        .all(|flag| attrs.get(*flag).and_then(AttrValue::as_bool) == Some(true))
}

fn fill_runs(api: &mut impl OmsApi, fill: u32) -> Result<Vec<u32>> {
    let query = Query::new("lumisections")
        .filter_eq("fill_number", fill)
        .fields(&["physics_flag", "beam1_stable", "beam2_stable", "run_number"])
        .per_page(PAGE_LIMIT);
    let records = api.fetch(&query)?;

    let mut stable_runs = pipe![
        |r: Record| r.attributes,
        filter(is_stable_physics),
        |attrs: Attributes| get_u32(&attrs, "run_number"),
        dedup_by(|run: &u32| *run),
        inspect(|run: &u32| debug!("[Runs] Fill {} has stable physics in run {}", fill, run)),
    ];
    let mut runs = stable_runs.run_all(records);
    runs.sort_unstable();

    if runs.is_empty() {
        warn!("[Runs] Fill {} has no run with stable beams and physics declared", fill);
    } else {
        info!("[Runs] Fill {} -> runs {:?}", fill, runs);
    }
    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oms::MemoryOms;
    use crate::record;

    fn ls(fill: u32, run: u32, physics: bool, beam1: bool, beam2: bool) -> Record {
        record! {
            "fill_number" => fill,
            "run_number" => run,
            "physics_flag" => physics,
            "beam1_stable" => beam1,
            "beam2_stable" => beam2,
        }
    }

    #[test]
    fn test_single_run() {
        let mut oms = MemoryOms::new();
        assert_eq!(resolve_runs(&mut oms, RunSelection::Run(386593)).unwrap(), vec![386593]);
        assert!(oms.queries().is_empty());
    }

    #[test]
    fn test_fill_keeps_only_stable_physics_runs() {
        let mut oms = MemoryOms::new().with(
            "lumisections",
            [
                ls(9044, 3, true, true, true),
                ls(9044, 1, false, true, true),
                ls(9044, 1, true, true, false),
                ls(9044, 2, true, true, true),
                ls(9044, 3, true, true, true),
                ls(9044, 2, true, false, true),
                ls(9045, 4, true, true, true),
            ],
        );

        let runs = resolve_runs(&mut oms, RunSelection::Fill(9044)).unwrap();
        assert_eq!(runs, vec![2, 3]);
    }

    #[test]
    fn test_missing_flag_is_not_stable() {
        let mut attrs = ls(1, 1, true, true, true).attributes.unwrap();
        assert!(is_stable_physics(&attrs));
        attrs.remove("beam2_stable");
        assert!(!is_stable_physics(&attrs));
        attrs.insert("beam2_stable".into(), AttrValue::Null);
        assert!(!is_stable_physics(&attrs));
    }

    #[test]
    fn test_fill_without_stable_beams() {
        let mut oms = MemoryOms::new().with("lumisections", [ls(8000, 5, false, false, false)]);
        assert!(resolve_runs(&mut oms, RunSelection::Fill(8000)).unwrap().is_empty());
    }
}
