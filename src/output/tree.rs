//! Tree formatter for scanned trees
//!
//! This module provides `TreeFormatter` which draws a complete `Tree` as
//! text, either into a string or to stdout with colors.

use std::io::{self, Write};

use termcolor::{Buffer, Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::path::ScanPath;
use crate::tree::{Node, Tree};

use super::config::OutputConfig;
use super::utils::child_prefix;

/// A child of a directory, in display order.
enum Child<'a> {
    File(&'a ScanPath),
    Dir(&'a Tree),
}

impl Child<'_> {
    fn path(&self) -> &ScanPath {
        match self {
            Child::File(path) => path,
            Child::Dir(tree) => tree.path(),
        }
    }
}

/// Formatter for tree drawings.
pub struct TreeFormatter {
    config: OutputConfig,
}

impl TreeFormatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Render the tree as plain text.
    pub fn format(&self, tree: &Tree) -> io::Result<String> {
        let mut buffer = Buffer::no_color();
        self.write_tree(tree, &mut buffer)?;
        Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
    }

    pub fn print(&self, tree: &Tree) -> io::Result<()> {
        let choice = if self.config.use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        let mut stdout = StandardStream::stdout(choice);
        self.write_tree(tree, &mut stdout)
    }

    fn write_tree<W: WriteColor>(&self, tree: &Tree, out: &mut W) -> io::Result<()> {
        let (dir_count, file_count) = self.write_node(tree, out, "", true, true)?;
        writeln!(out)?;
        writeln!(out, "{} directories, {} files", dir_count, file_count)?;
        Ok(())
    }

    fn write_node<W: WriteColor>(
        &self,
        tree: &Tree,
        out: &mut W,
        prefix: &str,
        is_last: bool,
        is_root: bool,
    ) -> io::Result<(usize, usize)> {
        let path = tree.path();
        let name = if is_root {
            path.root().display().to_string()
        } else {
            path.name().to_string_lossy().into_owned()
        };
        if !is_root {
            let connector = if is_last { "└── " } else { "├── " };
            write!(out, "{}{}", prefix, connector)?;
        }

        let dir = match &tree.0 {
            Node::Dir(dir) => dir,
            Node::Linked(linked) => {
                self.write_name(out, &name, Color::Cyan, false)?;
                if self.config.show_link_targets {
                    write!(out, " -> {}", linked.path.real().display())?;
                }
                writeln!(out, " [not followed]")?;
                return Ok((0, 0));
            }
            Node::Cyclic(cyclic) => {
                self.write_name(out, &name, Color::Yellow, false)?;
                if self.config.show_link_targets {
                    write!(out, " -> {}", cyclic.target_path.absolute().display())?;
                }
                writeln!(out, " [cycle]")?;
                return Ok((0, 0));
            }
        };

        self.write_name(out, &name, Color::Blue, true)?;
        if !is_root && path.is_symlink() && self.config.show_link_targets {
            write!(out, " -> {}", path.real().display())?;
        }
        writeln!(out)?;

        let new_prefix = if is_root {
            String::new()
        } else {
            child_prefix(prefix, is_last)
        };

        let mut children: Vec<Child<'_>> = dir
            .files
            .iter()
            .map(Child::File)
            .chain(dir.directories.iter().map(Child::Dir))
            .collect();
        children.sort_by(|a, b| a.path().relative().cmp(b.path().relative()));

        let mut dir_count = 0;
        let mut file_count = 0;
        for (i, child) in children.iter().enumerate() {
            let child_is_last = i == children.len() - 1;
            match child {
                Child::File(file) => {
                    self.write_file(out, file, &new_prefix, child_is_last)?;
                    file_count += 1;
                }
                Child::Dir(subtree) => {
                    let (d, f) = self.write_node(subtree, out, &new_prefix, child_is_last, false)?;
                    dir_count += d + 1;
                    file_count += f;
                }
            }
        }

        Ok((dir_count, file_count))
    }

    fn write_file<W: WriteColor>(
        &self,
        out: &mut W,
        file: &ScanPath,
        prefix: &str,
        is_last: bool,
    ) -> io::Result<()> {
        let connector = if is_last { "└── " } else { "├── " };
        write!(out, "{}{}", prefix, connector)?;
        let name = file.name().to_string_lossy();
        if file.is_symlink() {
            self.write_name(out, &name, Color::Cyan, false)?;
            if self.config.show_link_targets {
                write!(out, " -> {}", file.real().display())?;
            }
        } else {
            self.write_name(out, &name, Color::White, false)?;
        }
        writeln!(out)
    }

    fn write_name<W: WriteColor>(
        &self,
        out: &mut W,
        name: &str,
        color: Color,
        bold: bool,
    ) -> io::Result<()> {
        out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold))?;
        write!(out, "{}", name)?;
        out.reset()
    }
}
