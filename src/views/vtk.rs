//! Legacy ASCII VTK export of linearized meshes
//!
//! The files can be plotted using [Visit](https://wci.llnl.gov/simulation/computer-codes/visit) or ParaView.

use super::output::LinearizedOutput;
use std::fs::File;
use std::io::{BufWriter, Write};

const VTK_TRIANGLE: u8 = 5;
const VTK_LINE: u8 = 3;

fn create(path: impl AsRef<str>) -> std::io::Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path.as_ref())?))
}

/// Write the triangles with the vertex values as point data
///
/// In 3D mode the values are also used as the z coordinates.
pub fn write_solution(
    output: &LinearizedOutput,
    path: impl AsRef<str>,
    quantity_name: &str,
    mode_3d: bool,
) -> std::io::Result<()> {
    let mut writer = create(path)?;
    solution_to(&mut writer, output, quantity_name, mode_3d)?;
    writer.flush()
}

/// Write the triangles colored by their markers as cell data
pub fn write_markers(output: &LinearizedOutput, path: impl AsRef<str>) -> std::io::Result<()> {
    let mut writer = create(path)?;
    markers_to(&mut writer, output)?;
    writer.flush()
}

/// Write the edges as line cells with their markers as cell data
pub fn write_edges(output: &LinearizedOutput, path: impl AsRef<str>) -> std::io::Result<()> {
    let mut writer = create(path)?;
    edges_to(&mut writer, output)?;
    writer.flush()
}

fn header<W: Write>(writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "# vtk DataFile Version 3.0")?;
    writeln!(writer, "# File generated by fem_2d_views\n")?;
    writeln!(writer, "ASCII")?;
    writeln!(writer, "DATASET UNSTRUCTURED_GRID")
}

fn points<W: Write>(writer: &mut W, output: &LinearizedOutput, mode_3d: bool) -> std::io::Result<()> {
    writeln!(writer, "\nPOINTS {} double", output.vertices.len())?;
    for v in output.vertices.iter() {
        let z = if mode_3d { v.value } else { 0.0 };
        writeln!(writer, "{:.10} {:.10} {:.10}", v.x, v.y, z)?;
    }
    Ok(())
}

fn triangle_cells<W: Write>(writer: &mut W, output: &LinearizedOutput) -> std::io::Result<()> {
    let num_cells = output.triangles.len();

    writeln!(writer, "\nCELLS {} {}", num_cells, 4 * num_cells)?;
    for [a, b, c] in output.triangles.iter() {
        writeln!(writer, "3\t{}\t{}\t{}", a, b, c)?;
    }

    writeln!(writer, "\nCELL_TYPES {}", num_cells)?;
    for _ in 0..num_cells {
        writeln!(writer, "{}", VTK_TRIANGLE)?;
    }
    Ok(())
}

fn scalars_header<W: Write>(writer: &mut W, name: &str, kind: &str) -> std::io::Result<()> {
    writeln!(writer, "SCALARS {} {} 1", name.replace(char::is_whitespace, "_"), kind)?;
    writeln!(writer, "LOOKUP_TABLE default")
}

fn solution_to<W: Write>(
    writer: &mut W,
    output: &LinearizedOutput,
    quantity_name: &str,
    mode_3d: bool,
) -> std::io::Result<()> {
    header(writer)?;
    points(writer, output, mode_3d)?;
    triangle_cells(writer, output)?;

    writeln!(writer, "\nPOINT_DATA {}", output.vertices.len())?;
    scalars_header(writer, quantity_name, "double")?;
    for v in output.vertices.iter() {
        writeln!(writer, "{:.10}", v.value)?;
    }
    Ok(())
}

fn markers_to<W: Write>(writer: &mut W, output: &LinearizedOutput) -> std::io::Result<()> {
    header(writer)?;
    points(writer, output, false)?;
    triangle_cells(writer, output)?;

    writeln!(writer, "\nCELL_DATA {}", output.triangles.len())?;
    scalars_header(writer, "Markers", "int")?;
    for marker in output.triangle_markers.iter() {
        writeln!(writer, "{}", marker)?;
    }
    Ok(())
}

fn edges_to<W: Write>(writer: &mut W, output: &LinearizedOutput) -> std::io::Result<()> {
    header(writer)?;
    points(writer, output, false)?;

    let num_cells = output.edges.len();
    writeln!(writer, "\nCELLS {} {}", num_cells, 3 * num_cells)?;
    for [a, b] in output.edges.iter() {
        writeln!(writer, "2\t{}\t{}", a, b)?;
    }

    writeln!(writer, "\nCELL_TYPES {}", num_cells)?;
    for _ in 0..num_cells {
        writeln!(writer, "{}", VTK_LINE)?;
    }

    writeln!(writer, "\nCELL_DATA {}", num_cells)?;
    scalars_header(writer, "Markers", "int")?;
    for marker in output.edge_markers.iter() {
        writeln!(writer, "{}", marker)?;
    }
    Ok(())
}
