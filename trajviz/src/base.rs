use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use tracing::debug;

use crate::error::{Error, Result};

pub type Position = (f64, f64, f64);

/// Suffixes of the y and z components of an entity. The x component is the bare name.
const COMPONENT_SUFFIXES: [&str; 3] = ["", ".1", ".2"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityClass {
    Agent,
    Target,
}

impl EntityClass {
    pub fn tag(&self) -> &'static str {
        match self {
            EntityClass::Agent => "Agent",
            EntityClass::Target => "Target",
        }
    }
}

/// Wide time series: one row per time step, one column per entity state component.
#[derive(Clone, Debug)]
pub struct TrajectoryTable {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    num_frames: usize,
}

impl TrajectoryTable {
    pub fn new(columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let num_frames = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        if let Some((name, values)) = columns.iter().find(|(_, v)| v.len() != num_frames) {
            return Err(Error::Ragged {
                column: name.clone(),
                expected: num_frames,
                found: values.len(),
            });
        }

        let (names, columns) = columns.into_iter().unzip();
        Ok(TrajectoryTable {
            names,
            columns,
            num_frames,
        })
    }

    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let df = rename_cols(read_csv(path.as_ref())?)?;
        into_table(df)
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    /// Time axis, if the table carries a `time` column.
    pub fn time(&self) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n.eq_ignore_ascii_case("time"))
            .map(|i| self.columns[i].as_slice())
    }

    /// Base column names containing `class`, in column order. Derived y/z
    /// columns (anything with a dot) are skipped.
    pub fn entity_group(&self, class: &str) -> Vec<String> {
        self.names
            .iter()
            .filter(|n| n.contains(class) && !n.contains('.'))
            .cloned()
            .collect()
    }

    fn component(&self, entity: &str, suffix: &str) -> Result<&[f64]> {
        let column = format!("{}{}", entity, suffix);
        self.column(&column).ok_or_else(|| Error::MissingComponent {
            entity: entity.to_string(),
            column,
        })
    }

    pub fn trajectory(&self, entity: &str, class: EntityClass) -> Result<Trajectory> {
        let xs = self.component(entity, COMPONENT_SUFFIXES[0])?;
        let ys = self.component(entity, COMPONENT_SUFFIXES[1])?;
        let zs = self.component(entity, COMPONENT_SUFFIXES[2])?;

        let positions = xs
            .iter()
            .zip(ys.iter())
            .zip(zs.iter())
            .map(|((x, y), z)| (*x, *y, *z))
            .collect();

        Ok(Trajectory {
            name: entity.to_string(),
            class,
            positions,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    pub name: String,
    pub class: EntityClass,
    pub positions: Vec<Position>,
}

impl Trajectory {
    pub fn initial(&self) -> Option<Position> {
        self.positions.first().copied()
    }
}

/// Typed per-entity view of a table, built once after loading.
#[derive(Clone, Debug)]
pub struct Layout {
    pub agents: Vec<Trajectory>,
    pub targets: Vec<Trajectory>,
    pub time: Option<Vec<f64>>,
    pub num_frames: usize,
}

impl Layout {
    pub fn from_table(table: &TrajectoryTable) -> Result<Self> {
        let group = |class: EntityClass| -> Result<Vec<Trajectory>> {
            table
                .entity_group(class.tag())
                .iter()
                .map(|name| table.trajectory(name, class))
                .collect()
        };

        let agents = group(EntityClass::Agent)?;
        let targets = group(EntityClass::Target)?;
        debug!(
            agents = agents.len(),
            targets = targets.len(),
            frames = table.num_frames(),
            "built layout"
        );

        Ok(Layout {
            agents,
            targets,
            time: table.time().map(|t| t.to_vec()),
            num_frames: table.num_frames(),
        })
    }

    pub fn entities(&self) -> impl Iterator<Item = &Trajectory> {
        self.targets.iter().chain(self.agents.iter())
    }
}

fn read_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // The header row is read as data so that repeated names survive.
    let df = CsvReader::new(file).has_header(false).finish()?;
    Ok(df)
}

/// Renames the generic `column_<i>` columns after the header row. The k-th
/// repeat of a name becomes `name.k`.
fn rename_cols(mut df: DataFrame) -> Result<DataFrame> {
    let generic = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<String>>();

    let header = df
        .head(Some(1))
        .get_columns()
        .iter()
        .map(|s| -> Result<String> {
            let s = s.cast(&DataType::String)?;
            let name = s.str()?.get(0).unwrap_or("").trim().to_string();
            Ok(name)
        })
        .collect::<Result<Vec<String>>>()?;

    for (old, new) in generic.iter().zip(mangle_dupe_cols(&header)) {
        df.rename(old, &new)?;
    }

    let height = df.height();
    Ok(df.slice(1, height.saturating_sub(1)))
}

fn into_table(df: DataFrame) -> Result<TrajectoryTable> {
    let columns = df
        .get_columns()
        .iter()
        .map(|s| -> Result<(String, Vec<f64>)> {
            let name = s.name().to_string();
            let text = s.cast(&DataType::String)?;
            let values = text
                .str()?
                .into_iter()
                .enumerate()
                .map(|(row, cell)| parse_cell(&name, row, cell))
                .collect::<Result<Vec<f64>>>()?;
            Ok((name, values))
        })
        .collect::<Result<Vec<_>>>()?;

    TrajectoryTable::new(columns)
}

fn parse_cell(column: &str, row: usize, cell: Option<&str>) -> Result<f64> {
    let cell = cell.unwrap_or("").trim();
    cell.parse::<f64>().map_err(|_| Error::NonNumeric {
        column: column.to_string(),
        row,
        value: cell.to_string(),
    })
}

/// Disambiguates repeated header names with a dotted counter, leaving unique
/// names untouched.
pub fn mangle_dupe_cols(header: &[String]) -> Vec<String> {
    let mut taken: HashSet<String> = header.iter().cloned().collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    header
        .iter()
        .map(|name| {
            let count = counts.entry(name.as_str()).or_insert(0);
            if *count == 0 {
                *count = 1;
                return name.clone();
            }

            let mut mangled = format!("{}.{}", name, count);
            while taken.contains(&mangled) {
                *count += 1;
                mangled = format!("{}.{}", name, count);
            }
            *count += 1;
            taken.insert(mangled.clone());
            mangled
        })
        .collect()
}
