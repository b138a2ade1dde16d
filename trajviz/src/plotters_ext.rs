use plotters::element::{Drawable, PointCollection};
use plotters::style::ShapeStyle;
use plotters_backend::{BackendCoord, DrawingBackend, DrawingErrorKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerShape {
    // "o"
    Circle,
    // "x"
    Cross,
}

/// Point marker that keeps its pixel size under any coordinate projection.
pub struct Marker<Coord> {
    point: Coord,
    size: u32,
    shape: MarkerShape,
    style: ShapeStyle,
}

impl<Coord> Marker<Coord> {
    pub fn new<S: Into<ShapeStyle>>(point: Coord, size: u32, shape: MarkerShape, style: S) -> Self {
        Self {
            point,
            size,
            shape,
            style: style.into(),
        }
    }
}

impl<'a, Coord> PointCollection<'a, Coord> for &'a Marker<Coord> {
    type Point = &'a Coord;
    type IntoIter = std::iter::Once<&'a Coord>;
    fn point_iter(self) -> Self::IntoIter {
        std::iter::once(&self.point)
    }
}

impl<Coord, DB: DrawingBackend> Drawable<DB> for Marker<Coord> {
    fn draw<I: Iterator<Item = BackendCoord>>(
        &self,
        mut points: I,
        backend: &mut DB,
        _: (u32, u32),
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        let (x, y) = match points.next() {
            Some(p) => p,
            None => return Ok(()),
        };

        match self.shape {
            MarkerShape::Circle => {
                backend.draw_circle((x, y), self.size, &self.style, self.style.filled)
            }
            MarkerShape::Cross => {
                let s = self.size as i32;
                backend.draw_line((x - s, y - s), (x + s, y + s), &self.style)?;
                backend.draw_line((x - s, y + s), (x + s, y - s), &self.style)
            }
        }
    }
}
