use std::{collections::VecDeque, fmt};

use crate::{Color, NodeId, RbTree, SENTINEL};

impl<K> RbTree<K> {
    /// Writes the tree as a Graphviz `digraph` to `w`, one rank per tree level.
    ///
    /// Nodes are labelled with their key and filled with their color; sentinel leaves are drawn as
    /// points.
    pub fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
        K: fmt::Display,
    {
        if self.root == SENTINEL {
            return write!(w, "digraph \"graph-{name}\" {{}}");
        }

        enum Item {
            Node(NodeId),
            Missing(u32),
        }

        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(self.root));

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut missing = 0;
        let mut links = String::new();

        while !queue.is_empty() {
            use fmt::Write;

            write!(w, "{{rank=same; ")?;

            for _ in 0..queue.len() {
                let node = match queue.pop_front() {
                    Some(Item::Node(node)) => node,
                    Some(Item::Missing(id)) => {
                        write!(w, "\"graph{name}-missing{id}\" [shape=point]; ")?;
                        continue;
                    }
                    None => break,
                };

                let id = node.0;
                let key = self.key(node);
                let fill = match self.color(node) {
                    Color::Red => "red",
                    Color::Black => "black",
                };
                write!(
                    w,
                    "\"graph{name}-{id}\" [label=\"{key}\", style=filled, fillcolor={fill}, fontcolor=white]; "
                )?;

                for child in [self.links(node).left(), self.links(node).right()] {
                    if child == SENTINEL {
                        queue.push_back(Item::Missing(missing));
                        writeln!(links, "\"graph{name}-{id}\" -> \"graph{name}-missing{missing}\";")?;
                        missing += 1;
                    } else {
                        queue.push_back(Item::Node(child));
                        writeln!(links, "\"graph{name}-{id}\" -> \"graph{name}-{}\";", child.0)?;
                    }
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&links)?;

        w.write_str(" }\n}")
    }
}
