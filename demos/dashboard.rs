//! Dashboard Example - A scatter plot with two axes in a table
//!
//! This example demonstrates:
//! - Composing a plot, a y axis and an x axis in a Table
//! - Driving scale domains from a Dataset through a Perspective
//! - Deferred flushes and the on_flush broadcast
//!
//! Elements draw into a shared character canvas. By default the canvas is
//! printed after a headless flush; pass `--live` to mount on the terminal
//! (Ctrl+C quits).
//!
//! Run with: cargo run --example dashboard [-- --live]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crossterm::{cursor, execute, queue, style, terminal};

use spark_plot::{
    datum, mount, run, Bounds, Dataset, Engine, EngineConfig, FixedSurface, Invalidation,
    Layoutable, Listenable, Metadata, Perspective, PlotResult, QuantitativeScale, RenderFrame,
    Scale, Size, SpaceRequest,
};

// =============================================================================
// Canvas
// =============================================================================

#[derive(Default)]
struct Canvas {
    rows: Vec<Vec<char>>,
}

impl Canvas {
    fn clear(&mut self) {
        self.rows.clear();
    }

    /// Grows to fit; negative positions are dropped.
    fn put(&mut self, x: f64, y: f64, ch: char) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if self.rows.len() <= y {
            self.rows.resize(y + 1, Vec::new());
        }
        let row = &mut self.rows[y];
        if row.len() <= x {
            row.resize(x + 1, ' ');
        }
        row[x] = ch;
    }

    fn text(&mut self, x: f64, y: f64, text: &str) {
        for (i, ch) in text.chars().enumerate() {
            self.put(x + i as f64, y, ch);
        }
    }

    fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.rows.iter().map(|row| row.iter().collect())
    }
}

type SharedCanvas = Rc<RefCell<Canvas>>;

// =============================================================================
// Elements
// =============================================================================

struct ScatterPlot {
    data: Rc<Dataset>,
    x: Rc<QuantitativeScale>,
    y: Rc<QuantitativeScale>,
    canvas: SharedCanvas,
}

impl Layoutable for ScatterPlot {
    fn requested_space(&self, _offered: Size<f64>) -> SpaceRequest {
        SpaceRequest::greedy(0.0, 0.0)
    }

    fn render(&mut self, frame: &RenderFrame<'_>) -> PlotResult<()> {
        let Bounds { origin, size } = frame.bounds;
        let mut canvas = self.canvas.borrow_mut();
        for row in self.data.data() {
            let (Some(x), Some(y)) = (
                row.get("x").and_then(|v| v.as_number()),
                row.get("y").and_then(|v| v.as_number()),
            ) else {
                continue;
            };
            let px = origin.x + self.x.scale(x) * (size.width - 1.0);
            let py = origin.y + (1.0 - self.y.scale(y)) * (size.height - 1.0);
            canvas.put(px.round(), py.round(), '•');
        }
        Ok(())
    }
}

/// Vertical axis: fixed width, tick labels on the right edge.
struct YAxis {
    scale: Rc<QuantitativeScale>,
    canvas: SharedCanvas,
}

const Y_AXIS_WIDTH: f64 = 7.0;

impl Layoutable for YAxis {
    fn requested_space(&self, _offered: Size<f64>) -> SpaceRequest {
        SpaceRequest::fixed(Y_AXIS_WIDTH, 0.0)
    }

    fn is_fixed_width(&self) -> bool {
        true
    }

    fn render(&mut self, frame: &RenderFrame<'_>) -> PlotResult<()> {
        let Bounds { origin, size } = frame.bounds;
        let [lo, hi] = self.scale.domain();
        let mut canvas = self.canvas.borrow_mut();
        for y in 0..size.height as usize {
            canvas.put(origin.x + size.width - 1.0, origin.y + y as f64, '│');
        }
        for tick in self.scale.ticks(Some(4)) {
            let t = (tick - lo) / (hi - lo);
            let row = origin.y + ((1.0 - t) * (size.height - 1.0)).round();
            canvas.text(origin.x, row, &format!("{tick:>5.0} "));
        }
        Ok(())
    }
}

/// Horizontal axis: fixed height, a rule and tick labels below it.
struct XAxis {
    scale: Rc<QuantitativeScale>,
    canvas: SharedCanvas,
}

impl Layoutable for XAxis {
    fn requested_space(&self, _offered: Size<f64>) -> SpaceRequest {
        SpaceRequest::fixed(0.0, 2.0)
    }

    fn is_fixed_height(&self) -> bool {
        true
    }

    fn render(&mut self, frame: &RenderFrame<'_>) -> PlotResult<()> {
        let Bounds { origin, size } = frame.bounds;
        let [lo, hi] = self.scale.domain();
        let mut canvas = self.canvas.borrow_mut();
        for x in 0..size.width as usize {
            canvas.put(origin.x + x as f64, origin.y, '─');
        }
        for tick in self.scale.ticks(Some(5)) {
            let t = (tick - lo) / (hi - lo);
            let col = origin.x + (t * (size.width - 1.0)).round();
            canvas.text(col, origin.y + 1.0, &format!("{tick}"));
        }
        Ok(())
    }
}

// =============================================================================
// Main
// =============================================================================

fn samples(phase: f64) -> Vec<spark_plot::Datum> {
    (0..40)
        .map(|i| {
            let x = i as f64;
            datum([("x", x), ("y", (x / 4.0 + phase).sin() * 50.0 + 50.0)])
        })
        .collect()
}

fn main() -> PlotResult<()> {
    let live = std::env::args().any(|arg| arg == "--live");

    println!("=== spark-plot Dashboard Example ===\n");

    let engine = Engine::new(EngineConfig::default())?;
    let tree = engine.tree();
    let canvas: SharedCanvas = Rc::default();

    // Data → perspectives → scales
    let data = Dataset::new(samples(0.0), Metadata::new());
    let x = Rc::new(QuantitativeScale::linear());
    let y = Rc::new(QuantitativeScale::linear());
    // Projections last as long as their perspective
    let px = Perspective::new("scatter", "x", data.clone(), "x");
    let py = Perspective::new("scatter", "y", data.clone(), "y");
    px.project_onto(&x)?;
    py.project_onto(&y)?;

    // Components
    let plot = tree.add_element(ScatterPlot {
        data: data.clone(),
        x: x.clone(),
        y: y.clone(),
        canvas: canvas.clone(),
    });
    let y_axis = tree.add_element(YAxis {
        scale: y.clone(),
        canvas: canvas.clone(),
    });
    let x_axis = tree.add_element(XAxis {
        scale: x.clone(),
        canvas: canvas.clone(),
    });
    for (id, scale) in [(plot, &x), (plot, &y), (y_axis, &y), (x_axis, &x)] {
        tree.bind(id, scale, Invalidation::Render)?;
    }

    let root = tree.add_table(vec![
        vec![Some(y_axis), Some(plot)],
        vec![None, Some(x_axis)],
    ])?;
    tree.set_row_weight(root, 0, 1.0)?;
    tree.set_col_weight(root, 1, 1.0)?;

    if !live {
        engine
            .scheduler()
            .broadcaster()
            .register_listener("log", |_, stats| {
                println!("flush: {stats:?}");
                Ok(())
            });
        tree.anchor(root, Rc::new(FixedSurface::new(60.0, 16.0)))?;
        engine.flush()?;

        for line in canvas.borrow().lines() {
            println!("{line}");
        }
        println!("\nx domain: {:?}", x.domain());
        println!("y domain: {:?}", y.domain());

        // A data change only queues work until the next flush
        data.set_data(samples(1.5))?;
        println!(
            "\nafter set_data: render queued for plot = {}",
            engine.scheduler().is_queued_for_render(plot)
        );
        return Ok(());
    }

    // Live: print the canvas after every flush, then start a fresh one
    {
        let canvas = canvas.clone();
        engine
            .scheduler()
            .broadcaster()
            .register_listener("canvas", move |_, _| {
                let mut out = io::stdout();
                queue!(
                    out,
                    terminal::Clear(terminal::ClearType::All),
                    cursor::MoveTo(0, 0)
                )?;
                for line in canvas.borrow().lines() {
                    queue!(out, style::Print(line), cursor::MoveToNextLine(1))?;
                }
                out.flush()?;
                canvas.borrow_mut().clear();
                Ok(())
            });
    }

    terminal::enable_raw_mode()?;
    execute!(io::stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

    let handle = mount(&engine, root)?;
    let result = run(&handle);
    handle.unmount();

    execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}
