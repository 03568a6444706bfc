// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Tarjan's strongly-connected-components algorithm.
//!
//! One pass over the graph, driven by an explicit frame stack instead of
//! recursion, so the depth of the pipeline never touches the call stack.
//! Nodes are indices into the adjacency list.

const UNVISITED: usize = usize::MAX;

#[derive(Clone, Copy)]
struct Frame {
    node: usize,
    edge: usize,
}

/// Strongly-connected components of the graph, in completion order.
///
/// Every node appears in exactly one component; a node outside any cycle
/// forms a component of its own.
pub fn components(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let n = adjacency.len();
    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0; n];
    let mut on_stack = vec![false; n];
    let mut stack = Vec::new();
    let mut frames: Vec<Frame> = Vec::new();
    let mut next_index = 0;
    let mut found = Vec::new();

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }

        index[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;
        frames.push(Frame { node: root, edge: 0 });

        while let Some(&Frame { node: v, edge }) = frames.last() {
            if let Some(&w) = adjacency[v].get(edge) {
                if let Some(top) = frames.last_mut() {
                    top.edge += 1;
                }
                if index[w] == UNVISITED {
                    index[w] = next_index;
                    lowlink[w] = next_index;
                    next_index += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    frames.push(Frame { node: w, edge: 0 });
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w]);
                }
                continue;
            }

            frames.pop();
            if let Some(parent) = frames.last() {
                let p = parent.node;
                lowlink[p] = lowlink[p].min(lowlink[v]);
            }

            if lowlink[v] == index[v] {
                let mut scc = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    scc.push(w);
                    if w == v {
                        break;
                    }
                }
                found.push(scc);
            }
        }
    }

    found
}
