use std::ops::Range;

use plotters::coord::cartesian::Cartesian3d;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::base::{EntityClass, Layout, Position, Trajectory};
use crate::error::Result;
use crate::plotters_ext::{Marker, MarkerShape};

const MARKER_SIZE: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleState {
    /// Drawn with the full series, as created.
    Uninitialized,
    /// Holds the position of the given frame only.
    Synced(usize),
}

/// Mutable drawable bound to one agent.
#[derive(Clone, Debug, PartialEq)]
pub struct PlotHandle {
    pub name: String,
    pub planar: (f64, f64),
    pub depth: f64,
    pub state: HandleState,
}

impl PlotHandle {
    pub fn new(name: &str) -> Self {
        PlotHandle {
            name: name.to_string(),
            planar: (0.0, 0.0),
            depth: 0.0,
            state: HandleState::Uninitialized,
        }
    }

    pub fn set_data(&mut self, x: f64, y: f64) {
        self.planar = (x, y);
    }

    pub fn set_3d_properties(&mut self, z: f64) {
        self.depth = z;
    }

    pub fn position(&self) -> Position {
        (self.planar.0, self.planar.1, self.depth)
    }
}

/// Axis-aligned box enclosing every position in a layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Bounds {
    pub x: Range<f64>,
    pub y: Range<f64>,
    pub z: Range<f64>,
}

impl Bounds {
    pub fn of(layout: &Layout) -> Self {
        let mut lo = [f64::INFINITY; 3];
        let mut hi = [f64::NEG_INFINITY; 3];

        layout
            .entities()
            .flat_map(|t| t.positions.iter())
            .filter(|(x, y, z)| x.is_finite() && y.is_finite() && z.is_finite())
            .for_each(|&(x, y, z)| {
                for (i, v) in [x, y, z].iter().enumerate() {
                    lo[i] = lo[i].min(*v);
                    hi[i] = hi[i].max(*v);
                }
            });

        Bounds {
            x: padded(lo[0], hi[0]),
            y: padded(lo[1], hi[1]),
            z: padded(lo[2], hi[2]),
        }
    }
}

fn padded(lo: f64, hi: f64) -> Range<f64> {
    if lo > hi {
        return -1.0..1.0;
    }

    let pad = ((hi - lo) * 0.05).max(1e-3 * lo.abs().max(hi.abs())).max(0.5e-3);
    (lo - pad)..(hi + pad)
}

// plotters draws its second axis vertically
fn to_chart((x, y, z): Position) -> (f64, f64, f64) {
    (x, z, y)
}

/// Owns the layout and the agent handles for one display session.
pub struct Animator {
    layout: Layout,
    handles: Vec<PlotHandle>,
    bounds: Bounds,
    frame: Option<usize>,
}

impl Animator {
    pub fn new(layout: Layout) -> Self {
        let handles = layout
            .agents
            .iter()
            .map(|a| PlotHandle::new(&a.name))
            .collect();
        let bounds = Bounds::of(&layout);

        Animator {
            layout,
            handles,
            bounds,
            frame: None,
        }
    }

    pub fn num_frames(&self) -> usize {
        self.layout.num_frames
    }

    pub fn handles(&self) -> &[PlotHandle] {
        &self.handles
    }

    pub fn handle(&self, name: &str) -> Option<&PlotHandle> {
        self.handles.iter().find(|h| h.name == name)
    }

    pub fn targets(&self) -> &[Trajectory] {
        &self.layout.targets
    }

    /// Moves every agent handle to row `num`. Only that row is read.
    pub fn update(&mut self, num: usize) -> &[PlotHandle] {
        for (handle, agent) in self.handles.iter_mut().zip(self.layout.agents.iter()) {
            let (x, y, z) = agent.positions[num];
            handle.set_data(x, y);
            handle.set_3d_properties(z);
            handle.state = HandleState::Synced(num);
        }
        self.frame = Some(num);

        &self.handles
    }

    pub fn caption(&self) -> String {
        match (self.frame, self.layout.time.as_ref()) {
            (Some(i), Some(time)) => format!("t={:.2}", time[i]),
            (Some(i), None) => format!("frame {}", i),
            (None, _) => String::from("initial"),
        }
    }

    pub fn draw<DB: DrawingBackend>(&self, drawing_area: &DrawingArea<DB, Shift>) -> Result<()> {
        drawing_area.fill(&WHITE)?;

        let bounds = &self.bounds;
        let mut chart = ChartBuilder::on(drawing_area)
            .caption(self.caption(), ("sans-serif", 20))
            .margin(10)
            .build_cartesian_3d(bounds.x.clone(), bounds.z.clone(), bounds.y.clone())?;

        chart.with_projection(|mut pb| {
            pb.pitch = 0.5;
            pb.yaw = 0.9;
            pb.scale = 0.8;
            pb.into_matrix()
        });

        chart
            .configure_axes()
            .light_grid_style(BLACK.mix(0.1))
            .max_light_lines(3)
            .draw()?;

        let labels = [
            ("x", (bounds.x.end, bounds.y.start, bounds.z.start)),
            ("y", (bounds.x.start, bounds.y.end, bounds.z.start)),
            ("z", (bounds.x.start, bounds.y.start, bounds.z.end)),
        ];
        chart.draw_series(
            labels
                .iter()
                .map(|(text, at)| Text::new(*text, to_chart(*at), ("sans-serif", 15))),
        )?;

        for target in self.layout.targets.iter() {
            if let Some(initial) = target.initial() {
                chart.draw_series(std::iter::once(marker(initial, EntityClass::Target)))?;
            }
            draw_trace(&mut chart, target)?;
        }

        for (handle, agent) in self.handles.iter().zip(self.layout.agents.iter()) {
            match handle.state {
                HandleState::Uninitialized => draw_trace(&mut chart, agent)?,
                HandleState::Synced(_) => {
                    chart.draw_series(std::iter::once(marker(
                        handle.position(),
                        EntityClass::Agent,
                    )))?;
                }
            }
        }

        Ok(())
    }

    pub fn into_layout(self) -> Layout {
        self.layout
    }
}

fn style_of(class: EntityClass) -> (RGBColor, MarkerShape) {
    match class {
        EntityClass::Agent => (BLUE, MarkerShape::Circle),
        EntityClass::Target => (RED, MarkerShape::Cross),
    }
}

fn marker(position: Position, class: EntityClass) -> Marker<(f64, f64, f64)> {
    let (color, shape) = style_of(class);
    let style = match shape {
        MarkerShape::Circle => color.filled(),
        MarkerShape::Cross => color.stroke_width(2),
    };
    Marker::new(to_chart(position), MARKER_SIZE, shape, style)
}

type Chart3d<'a, DB> = ChartContext<
    'a,
    DB,
    Cartesian3d<
        plotters::coord::types::RangedCoordf64,
        plotters::coord::types::RangedCoordf64,
        plotters::coord::types::RangedCoordf64,
    >,
>;

fn draw_trace<DB: DrawingBackend>(chart: &mut Chart3d<'_, DB>, trajectory: &Trajectory) -> Result<()> {
    let (color, _) = style_of(trajectory.class);
    let class = trajectory.class;

    chart.draw_series(LineSeries::new(
        trajectory.positions.iter().map(|p| to_chart(*p)),
        &color,
    ))?;
    chart.draw_series(trajectory.positions.iter().map(|p| marker(*p, class)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TrajectoryTable;

    fn table(rows: usize) -> TrajectoryTable {
        let col = |offset: f64| (0..rows).map(|i| offset + i as f64).collect::<Vec<f64>>();
        TrajectoryTable::new(vec![
            ("time".to_string(), col(0.0)),
            ("Agent0".to_string(), col(0.0)),
            ("Agent0.1".to_string(), col(10.0)),
            ("Agent0.2".to_string(), col(20.0)),
            ("Agent1".to_string(), col(-5.0)),
            ("Agent1.1".to_string(), col(-6.0)),
            ("Agent1.2".to_string(), col(-7.0)),
            ("Target0".to_string(), vec![3.0; rows]),
            ("Target0.1".to_string(), vec![3.0; rows]),
            ("Target0.2".to_string(), vec![3.0; rows]),
        ])
        .unwrap()
    }

    fn layout(rows: usize) -> Layout {
        Layout::from_table(&table(rows)).unwrap()
    }

    #[test]
    fn test_create_handles() {
        let animator = Animator::new(layout(4));
        let names = animator
            .handles()
            .iter()
            .map(|h| h.name.as_str())
            .collect::<Vec<&str>>();
        assert_eq!(names, vec!["Agent0", "Agent1"]);
        assert!(animator
            .handles()
            .iter()
            .all(|h| h.state == HandleState::Uninitialized));
        assert_eq!(animator.targets().len(), 1);
    }

    #[test]
    fn test_update_matches_rows() {
        let table = table(5);
        let mut animator = Animator::new(Layout::from_table(&table).unwrap());

        for i in 0..table.num_frames() {
            let handles = animator.update(i);
            assert_eq!(handles.len(), 2);
            for handle in handles.iter() {
                let column = |suffix: &str| {
                    table.column(&format!("{}{}", handle.name, suffix)).unwrap()[i]
                };
                assert_eq!(handle.planar, (column(""), column(".1")));
                assert_eq!(handle.depth, column(".2"));
                assert_eq!(handle.state, HandleState::Synced(i));
            }
        }

        let agent0 = animator.handle("Agent0").unwrap();
        assert_eq!(agent0.planar, (4.0, 14.0));
        assert_eq!(agent0.depth, 24.0);
    }

    #[test]
    fn test_into_layout() {
        let mut animator = Animator::new(layout(3));
        animator.update(1);
        let layout = animator.into_layout();
        assert_eq!(layout.num_frames, 3);
        assert_eq!(layout.agents[1].name, "Agent1");
    }

    #[test]
    fn test_caption() {
        let mut animator = Animator::new(layout(3));
        assert_eq!(animator.caption(), "initial");
        animator.update(2);
        assert_eq!(animator.caption(), "t=2.00");
    }

    #[test]
    fn test_bounds_cover_all_positions() {
        let bounds = Bounds::of(&layout(3));
        assert!(bounds.x.start < -5.0 && bounds.x.end > 3.0);
        assert!(bounds.y.start < -6.0 && bounds.y.end > 12.0);
        assert!(bounds.z.start < -7.0 && bounds.z.end > 22.0);
    }

    #[test]
    fn test_bounds_of_empty_layout() {
        let bounds = Bounds::of(&layout(0));
        assert_eq!(bounds.x, -1.0..1.0);
    }

    #[test]
    fn test_bounds_of_single_point() {
        let bounds = Bounds::of(&layout(1));
        assert!(bounds.x.start < bounds.x.end);
    }

    #[test]
    fn test_draw_frames() {
        let (w, h) = (320u32, 240u32);
        let mut animator = Animator::new(layout(3));
        let mut buf = vec![0u8; (w * h * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
            animator.draw(&root).unwrap();
            animator.update(1);
            animator.draw(&root).unwrap();
            root.present().unwrap();
        }

        assert!(buf.iter().any(|&b| b == 255));
        assert!(buf.iter().any(|&b| b != 255));
    }
}
