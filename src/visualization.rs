//! Visualization utilities for TSP tours.
//!
//! Two renderings of a finished tour:
//! - [`TurtleScript`]: a Python turtle script, one drawing per emitted tour,
//!   each followed by a pause waiting for the return key
//! - [`Visualizer`]: SVG, optionally rasterised to PNG
//!
//! Both only read a finished [`Solution`]; the solvers never call into here.

use crate::error::{TspError, TspResult};
use crate::instance::{TspInstance, COORD_MAX};
use crate::solution::Solution;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process::Command;
#[cfg(feature = "png")]
use resvg::render;
#[cfg(feature = "png")]
use resvg::tiny_skia::{Pixmap, Transform};
#[cfg(feature = "png")]
use resvg::usvg;
#[cfg(feature = "png")]
use resvg::usvg::TreeParsing;
#[cfg(feature = "png")]
use resvg::FitTo;

/// Python turtle script showing successive tours over one point set.
///
/// Each tour is written and flushed as soon as it is pushed, so an
/// interrupted run still leaves every finished drawing on disk.
pub struct TurtleScript<W: Write = BufWriter<File>> {
    writer: W,
    /// Emit `input(...)` after each tour
    pub pause: bool,
    tours: usize,
}

impl TurtleScript<BufWriter<File>> {
    /// Create the script file at `path` and write its header.
    pub fn create<P: AsRef<Path>>(instance: &TspInstance, path: P) -> TspResult<Self> {
        if !instance.has_coordinates() {
            return Err(TspError::MissingCoordinates);
        }
        Self::new(instance, BufWriter::new(File::create(path)?))
    }
}

impl<W: Write> TurtleScript<W> {
    /// Start a script on `writer`: world coordinates and one `p<i>=(x,y)`
    /// per vertex.
    pub fn new(instance: &TspInstance, mut writer: W) -> TspResult<Self> {
        if !instance.has_coordinates() {
            return Err(TspError::MissingCoordinates);
        }
        writeln!(writer, "import turtle")?;
        writeln!(
            writer,
            "turtle.setworldcoordinates(0, 0, {}, {})",
            COORD_MAX,
            COORD_MAX + 100
        )?;
        for (i, p) in instance.points.iter().enumerate() {
            writeln!(writer, "p{}=({},{})", i, p.x, p.y)?;
        }
        writer.flush()?;
        Ok(TurtleScript {
            writer,
            pause: true,
            tours: 0,
        })
    }

    /// Write the drawing of `solution`, captioned with its length.
    pub fn push_tour(&mut self, solution: &Solution) -> TspResult<()> {
        let w = &mut self.writer;
        writeln!(w, "turtle.clear()")?;
        writeln!(w, "turtle.tracer(0,0)")?;
        writeln!(w, "turtle.penup()")?;
        writeln!(w, "turtle.goto(0,{})", COORD_MAX + 50)?;
        writeln!(w, "turtle.write(\"Total length = {}\")", solution.length)?;
        writeln!(w, "turtle.speed(0)")?;
        if let Some(&first) = solution.tour.first() {
            writeln!(w, "turtle.goto(p{})", first)?;
            writeln!(w, "turtle.pendown()")?;
            for v in &solution.tour[1..] {
                writeln!(w, "turtle.goto(p{})", v)?;
            }
            writeln!(w, "turtle.goto(p{})", first)?;
        }
        writeln!(w, "turtle.update()")?;
        if self.pause {
            writeln!(w, "wait = input(\"Enter return to continue\")")?;
        }
        w.flush()?;
        self.tours += 1;
        Ok(())
    }

    /// Number of tours written so far.
    pub fn tours(&self) -> usize {
        self.tours
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> TspResult<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// SVG visualization generator
pub struct Visualizer {
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Margin
    pub margin: f64,
    /// Node radius
    pub node_radius: f64,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer {
            width: 800.0,
            height: 800.0,
            margin: 50.0,
            node_radius: 6.0,
        }
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate SVG visualization of a solution
    pub fn generate_svg(&self, instance: &TspInstance, solution: &Solution) -> TspResult<String> {
        if !instance.has_coordinates() {
            return Err(TspError::MissingCoordinates);
        }
        let mut svg = String::new();

        let (min_x, max_x, min_y, max_y) = self.get_bounds(instance);
        let scale_x = (self.width - 2.0 * self.margin) / (max_x - min_x).max(1.0);
        let scale_y = (self.height - 2.0 * self.margin) / (max_y - min_y).max(1.0);
        let scale = scale_x.min(scale_y);

        let _ = write!(
            svg,
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .node {{ fill: #3498db; stroke: #2c3e50; stroke-width: 2; }}
    .depot {{ fill: #e74c3c; stroke: #c0392b; stroke-width: 2; }}
    .edge {{ stroke: #34495e; stroke-width: 2; fill: none; }}
    .label {{ font-family: Arial; font-size: 10px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ecf0f1"/>
"##,
            self.width, self.height, self.width, self.height
        );

        let _ = writeln!(
            svg,
            r##"<text x="{}" y="25" class="title">Instance: {} | {} | Length: {}</text>"##,
            self.margin, instance.name, solution.algorithm, solution.length
        );

        let transform = |x: f64, y: f64| -> (f64, f64) {
            let tx = self.margin + (x - min_x) * scale;
            let ty = self.height - self.margin - (y - min_y) * scale;
            (tx, ty)
        };

        if solution.tour.len() > 1 {
            for i in 0..solution.tour.len() {
                let from = instance.points[solution.tour[i]];
                let to = instance.points[solution.tour[(i + 1) % solution.tour.len()]];
                let (x1, y1) = transform(from.x as f64, from.y as f64);
                let (x2, y2) = transform(to.x as f64, to.y as f64);
                let _ = writeln!(
                    svg,
                    r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" class="edge"/>"#,
                    x1, y1, x2, y2
                );
            }
        }

        for (id, p) in instance.points.iter().enumerate() {
            let (x, y) = transform(p.x as f64, p.y as f64);
            let class = if id == 0 { "depot" } else { "node" };
            let _ = writeln!(
                svg,
                r##"<circle cx="{:.2}" cy="{:.2}" r="{}" class="{}"/>"##,
                x, y, self.node_radius, class
            );
            let _ = writeln!(
                svg,
                r##"<text x="{:.2}" y="{:.2}" class="label" text-anchor="middle">{}</text>"##,
                x,
                y - self.node_radius - 3.0,
                id
            );
        }

        svg.push_str("</svg>");
        Ok(svg)
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(svg.as_bytes())?;
        Ok(())
    }

    /// Save SVG as PNG. Uses resvg when built with the `png` feature and
    /// falls back to `rsvg-convert`, then `magick convert`, then `inkscape`.
    pub fn save_png<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        let path = path.as_ref();
        #[cfg(feature = "png")]
        {
            match self.save_png_native(svg, path) {
                Ok(()) => return Ok(()),
                Err(e) => log::warn!("native PNG rendering failed ({}), trying external converters", e),
            }
        }
        self.save_png_external(svg, path)
    }

    #[cfg(feature = "png")]
    fn save_png_native(&self, svg: &str, path: &Path) -> std::io::Result<()> {
        let opt = usvg::Options::default();
        let rtree = usvg::Tree::from_str(svg, &opt).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::Other, format!("usvg parse error: {}", e))
        })?;
        let mut pixmap = Pixmap::new(self.width as u32, self.height as u32)
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "Failed to create pixmap"))?;
        render(&rtree, FitTo::Original, Transform::default(), pixmap.as_mut())
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "resvg render failed"))?;
        pixmap.save_png(path).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::Other, format!("save_png failed: {}", e))
        })
    }

    fn save_png_external(&self, svg: &str, path: &Path) -> std::io::Result<()> {
        let tmp_svg = path.with_extension("svg.tmp");
        self.save_svg(svg, &tmp_svg)?;
        let tmp = tmp_svg.to_string_lossy().to_string();
        let out = path.to_string_lossy().to_string();

        let attempts: [(&str, Vec<&str>); 3] = [
            ("rsvg-convert", vec!["-o", &out, &tmp]),
            ("magick", vec!["convert", &tmp, &out]),
            ("inkscape", vec![&tmp, "--export-type=png", "--export-filename", &out]),
        ];
        for (program, args) in attempts.iter() {
            if let Ok(status) = Command::new(program).args(args).status() {
                if status.success() {
                    let _ = std::fs::remove_file(&tmp_svg);
                    return Ok(());
                }
            }
        }

        let _ = std::fs::remove_file(&tmp_svg);
        Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "No SVG->PNG converter succeeded (tried rsvg-convert, magick, inkscape)",
        ))
    }

    /// Get coordinate bounds
    fn get_bounds(&self, instance: &TspInstance) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for p in &instance.points {
            min_x = min_x.min(p.x as f64);
            max_x = max_x.max(p.x as f64);
            min_y = min_y.min(p.y as f64);
            max_y = max_y.max(p.y as f64);
        }

        (min_x, max_x, min_y, max_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Point;

    fn create_test_instance() -> TspInstance {
        TspInstance::from_points(
            "test",
            vec![Point::new(10, 20), Point::new(300, 40), Point::new(50, 700)],
        )
    }

    #[test]
    fn test_turtle_script_layout() {
        let instance = create_test_instance();
        let solution = Solution::from_tour(&instance, vec![0, 2, 1], "test");
        let mut script = TurtleScript::new(&instance, Vec::<u8>::new()).unwrap();
        script.push_tour(&solution).unwrap();
        assert_eq!(script.tours(), 1);

        let text = String::from_utf8(script.finish().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "import turtle");
        assert_eq!(lines[1], "turtle.setworldcoordinates(0, 0, 1000, 1100)");
        assert_eq!(lines[2], "p0=(10,20)");
        assert_eq!(lines[4], "p2=(50,700)");
        assert!(lines.contains(&"turtle.goto(0,1050)"));
        let caption = format!("turtle.write(\"Total length = {}\")", solution.length);
        assert!(lines.contains(&caption.as_str()));
        let gotos: Vec<&str> = lines.iter().copied().filter(|l| l.starts_with("turtle.goto(p")).collect();
        assert_eq!(gotos, vec!["turtle.goto(p0)", "turtle.goto(p2)", "turtle.goto(p1)", "turtle.goto(p0)"]);
        assert_eq!(*lines.last().unwrap(), "wait = input(\"Enter return to continue\")");
    }

    #[test]
    fn test_turtle_script_without_pause() {
        let instance = create_test_instance();
        let solution = Solution::from_tour(&instance, vec![0, 1, 2], "test");
        let mut script = TurtleScript::new(&instance, Vec::<u8>::new()).unwrap();
        script.pause = false;
        script.push_tour(&solution).unwrap();
        script.push_tour(&solution).unwrap();
        let text = String::from_utf8(script.finish().unwrap()).unwrap();
        assert!(!text.contains("input("));
        assert_eq!(text.matches("turtle.clear()").count(), 2);
    }

    #[test]
    fn test_turtle_script_streams_to_file() {
        let instance = create_test_instance();
        let solution = Solution::from_tour(&instance, vec![0, 1, 2], "test");
        let path = std::env::temp_dir().join(format!("tsp-turtle-{}.py", std::process::id()));

        let mut script = TurtleScript::create(&instance, &path).unwrap();
        let header = std::fs::read_to_string(&path).unwrap();
        assert!(header.starts_with("import turtle\n"));
        assert!(!header.contains("turtle.clear()"));

        script.push_tour(&solution).unwrap();
        // visible on disk before the script is finished
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.matches("turtle.clear()").count(), 1);
        assert!(written.ends_with("wait = input(\"Enter return to continue\")\n"));

        drop(script);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_requires_coordinates() {
        let rows = vec![vec![0, 1], vec![1, 0]];
        let instance = TspInstance::from_cost_matrix("m", &rows).unwrap();
        let solution = Solution::from_tour(&instance, vec![0, 1], "test");
        assert!(matches!(TurtleScript::new(&instance, Vec::<u8>::new()), Err(TspError::MissingCoordinates)));
        assert!(Visualizer::new().generate_svg(&instance, &solution).is_err());
    }

    #[test]
    fn test_visualizer() {
        let instance = create_test_instance();
        let solution = Solution::from_tour(&instance, vec![0, 1, 2], "test");

        let viz = Visualizer::new();
        let svg = viz.generate_svg(&instance, &solution).unwrap();

        assert!(svg.starts_with("<?xml"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("class=\"edge\"").count(), 3);
        assert_eq!(svg.matches("class=\"depot\"").count(), 1);
    }
}
