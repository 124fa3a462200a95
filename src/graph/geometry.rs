//! Plane geometry for boxes and edge routing.

/// A point in graph (world) coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal coordinate, growing to the right.
	pub x: f64,
	/// Vertical coordinate, growing downwards.
	pub y: f64,
}

impl Point {
	/// Point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance.
	pub fn distance(self, other: Point) -> f64 {
		(other.x - self.x).hypot(other.y - self.y)
	}
}

/// Axis-aligned rectangle; `(x, y)` is the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	/// Left edge.
	pub x: f64,
	/// Top edge.
	pub y: f64,
	/// Horizontal extent.
	pub width: f64,
	/// Vertical extent.
	pub height: f64,
}

impl Rect {
	/// Rectangle with top-left `(x, y)`.
	pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self {
			x,
			y,
			width,
			height,
		}
	}

	/// Top-left corner.
	pub fn origin(&self) -> Point {
		Point::new(self.x, self.y)
	}

	/// Center.
	pub fn center(&self) -> Point {
		Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
	}

	/// `x + width`.
	pub fn right(&self) -> f64 {
		self.x + self.width
	}

	/// `y + height`.
	pub fn bottom(&self) -> f64 {
		self.y + self.height
	}

	/// Same size, moved by `(dx, dy)`.
	pub fn translate(&self, dx: f64, dy: f64) -> Self {
		Self::new(self.x + dx, self.y + dy, self.width, self.height)
	}

	/// True when `p` is inside or on the border.
	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
	}

	/// True when the interiors overlap (touching edges do not count).
	pub fn intersects(&self, other: &Rect) -> bool {
		self.x < other.right()
			&& other.x < self.right()
			&& self.y < other.bottom()
			&& other.y < self.bottom()
	}

	/// Where the ray from the centre towards `toward` leaves the rectangle.
	///
	/// Whichever of the vertical or horizontal sides the ray reaches first
	/// wins. A target at the centre itself yields the centre.
	pub fn boundary_point(&self, toward: Point) -> Point {
		let c = self.center();
		let (dx, dy) = (toward.x - c.x, toward.y - c.y);
		if dx == 0.0 && dy == 0.0 {
			return c;
		}

		let angle = dy.atan2(dx);
		let (cos, sin) = (angle.cos(), angle.sin());
		let tx = (self.width / 2.0 / cos).abs();
		let ty = (self.height / 2.0 / sin).abs();
		let t = tx.min(ty);
		Point::new(c.x + cos * t, c.y + sin * t)
	}
}

/// A routed call edge, already clipped to both shapes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeRoute {
	/// Where the edge leaves the source.
	pub start: Point,
	/// First bezier control point.
	pub control1: Point,
	/// Second bezier control point.
	pub control2: Point,
	/// Where the edge meets the target.
	pub end: Point,
	/// Direction of the arrowhead at `end`, in radians.
	pub arrow_angle: f64,
}

/// Routes an edge between two boxes.
///
/// Both ends are clipped to their box boundaries along the centre-to-centre
/// line. With `curve_offset > 0` the path is a cubic curve whose control
/// points leave and enter horizontally; otherwise it is straight. The arrow
/// follows the tangent at the target end.
pub fn route_edge(source: &Rect, target: &Rect, curve_offset: f64) -> EdgeRoute {
	let end = target.boundary_point(source.center());
	let start = source.boundary_point(target.center());

	if curve_offset <= 0.0 {
		let arrow_angle = (end.y - start.y).atan2(end.x - start.x);
		return EdgeRoute {
			start,
			control1: start,
			control2: end,
			end,
			arrow_angle,
		};
	}

	let dx = end.x - start.x;
	let offset = if dx > 0.0 { curve_offset } else { -curve_offset };
	let control1 = Point::new(start.x + offset, start.y);
	let control2 = Point::new(end.x - offset, end.y);
	let arrow_angle = (end.y - control2.y).atan2(end.x - control2.x);

	EdgeRoute {
		start,
		control1,
		control2,
		end,
		arrow_angle,
	}
}

/// Corners of an arrowhead of `length` × `2 * half_width` pointing along
/// `angle`, tip first.
pub fn arrowhead(tip: Point, angle: f64, length: f64, half_width: f64) -> [Point; 3] {
	let (cos, sin) = (angle.cos(), angle.sin());
	let rotate = |x: f64, y: f64| Point::new(tip.x + x * cos - y * sin, tip.y + x * sin + y * cos);
	[tip, rotate(-length, -half_width), rotate(-length, half_width)]
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::f64::consts::{FRAC_PI_2, PI};

	const EPS: f64 = 1e-9;

	fn close(a: Point, b: Point) -> bool {
		(a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
	}

	#[test]
	fn boundary_point_hits_the_side_facing_the_target() {
		let r = Rect::new(0.0, 0.0, 100.0, 40.0);
		assert!(close(r.boundary_point(Point::new(500.0, 20.0)), Point::new(100.0, 20.0)));
		assert!(close(r.boundary_point(Point::new(-500.0, 20.0)), Point::new(0.0, 20.0)));
		assert!(close(r.boundary_point(Point::new(50.0, 300.0)), Point::new(50.0, 40.0)));
		assert!(close(r.boundary_point(Point::new(50.0, -300.0)), Point::new(50.0, 0.0)));
	}

	#[test]
	fn boundary_point_on_a_diagonal_uses_the_first_crossing() {
		// Wide box: a 45° ray exits through the bottom before the right side.
		let r = Rect::new(0.0, 0.0, 100.0, 20.0);
		let p = r.boundary_point(Point::new(150.0, 110.0));
		assert!((p.y - 20.0).abs() < EPS);
		assert!((p.x - 60.0).abs() < EPS);
	}

	#[test]
	fn boundary_point_of_coincident_centres_is_the_centre() {
		let r = Rect::new(10.0, 10.0, 20.0, 20.0);
		assert_eq!(r.boundary_point(Point::new(20.0, 20.0)), Point::new(20.0, 20.0));
	}

	#[test]
	fn curved_route_enters_target_horizontally() {
		let source = Rect::new(0.0, 0.0, 50.0, 50.0);
		let target = Rect::new(300.0, 100.0, 20.0, 20.0);
		let route = route_edge(&source, &target, 50.0);
		assert!(route.start.x <= 50.0 + EPS);
		assert!(route.end.x >= 300.0 - EPS);
		assert!(route.arrow_angle.abs() < EPS);
		assert!(close(route.control1, Point::new(route.start.x + 50.0, route.start.y)));
	}

	#[test]
	fn curved_route_leftwards_points_arrow_left() {
		let source = Rect::new(300.0, 0.0, 50.0, 50.0);
		let target = Rect::new(0.0, 0.0, 20.0, 20.0);
		let route = route_edge(&source, &target, 50.0);
		assert!((route.arrow_angle.abs() - PI).abs() < EPS);
	}

	#[test]
	fn straight_route_arrow_follows_the_line() {
		let source = Rect::new(0.0, 0.0, 10.0, 10.0);
		let target = Rect::new(0.0, 100.0, 10.0, 10.0);
		let route = route_edge(&source, &target, 0.0);
		assert!(close(route.start, Point::new(5.0, 10.0)));
		assert!(close(route.end, Point::new(5.0, 100.0)));
		assert!((route.arrow_angle - FRAC_PI_2).abs() < EPS);
	}

	#[test]
	fn arrowhead_trails_behind_the_tip() {
		let [tip, a, b] = arrowhead(Point::new(10.0, 0.0), 0.0, 8.0, 4.0);
		assert_eq!(tip, Point::new(10.0, 0.0));
		assert!(close(a, Point::new(2.0, -4.0)));
		assert!(close(b, Point::new(2.0, 4.0)));
	}

	#[test]
	fn intersects_ignores_touching_edges() {
		let a = Rect::new(0.0, 0.0, 10.0, 10.0);
		assert!(!a.intersects(&Rect::new(10.0, 0.0, 10.0, 10.0)));
		assert!(a.intersects(&Rect::new(9.0, 9.0, 10.0, 10.0)));
	}
}
