//! Knowledge graph with symmetric links and resonance diffusion.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::constants::{DIFFUSION_ROUNDS, DIFFUSION_SHARE, PHI};
use crate::dna::AgenticDna;
use crate::id;
use crate::token::FluidToken;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeType {
    Concept,
    Relation,
    Entity,
    Symbolic,
}

pub type Metadata = BTreeMap<String, Value>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbolic_sequence: Option<String>,
    pub resonance: f64,
    /// Neighbor ids in link order. Always mirrored on the neighbor.
    pub connections: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Everything about a node except its id and links.
#[derive(Clone, Debug)]
pub struct NewNode {
    pub kind: NodeType,
    pub label: String,
    pub symbolic_sequence: Option<String>,
    pub resonance: f64,
    pub metadata: Option<Metadata>,
}

/// Diffused resonance per node, in graph insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResonanceField(Vec<(String, f64)>);

impl ResonanceField {
    pub fn get(&self, id: &str) -> Option<f64> {
        self.0.iter().find(|(k, _)| k == id).map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Mean value; an empty field averages to 0.
    pub fn mean(&self) -> f64 {
        self.values().sum::<f64>() / self.0.len().max(1) as f64
    }
}

#[derive(Clone, Debug)]
pub struct KnowledgeGraph {
    nodes: Vec<KnowledgeNode>,
    index: HashMap<String, usize>,
}

impl Default for KnowledgeGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn foundation(id: &str, kind: NodeType, label: &str, sequence: &str, resonance: f64) -> KnowledgeNode {
    KnowledgeNode {
        id: id.to_string(),
        kind,
        label: label.to_string(),
        symbolic_sequence: Some(sequence.to_string()),
        resonance,
        connections: Vec::new(),
        metadata: None,
    }
}

impl KnowledgeGraph {
    /// Graph seeded with three mutually linked foundation nodes.
    pub fn new() -> Self {
        let mut graph = Self::empty();
        let seeds = [
            foundation(
                "quantum-consciousness",
                NodeType::Symbolic,
                "Quantum Consciousness",
                "Ψ(Σ(HΩ)↔∫(λΔ))",
                0.95,
            ),
            foundation(
                "fractal-intelligence",
                NodeType::Symbolic,
                "Fractal Intelligence",
                "(∇Σ(Γ×λ))↔(Ω(√ħ)⊗ε0)",
                0.87,
            ),
            foundation(
                "recursive-cognition",
                NodeType::Concept,
                "Recursive Cognition",
                "(∫(ΣN))↔(Δ(ℚL))",
                0.91,
            ),
        ];
        let ids: Vec<String> = seeds.iter().map(|n| n.id.clone()).collect();
        for node in seeds {
            graph.insert(node);
        }
        graph.connect_nodes(&ids[0], &ids[1]);
        graph.connect_nodes(&ids[0], &ids[2]);
        graph.connect_nodes(&ids[1], &ids[2]);
        graph
    }

    /// Graph with no nodes at all.
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn insert(&mut self, node: KnowledgeNode) -> &KnowledgeNode {
        let slot = self.nodes.len();
        self.index.insert(node.id.clone(), slot);
        self.nodes.push(node);
        &self.nodes[slot]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[KnowledgeNode] {
        &self.nodes
    }

    pub fn get_node(&self, id: &str) -> Option<&KnowledgeNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Undirected edge count.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.connections.len()).sum::<usize>() / 2
    }

    pub fn add_node(&mut self, node: NewNode, rng: &mut impl Rng) -> &KnowledgeNode {
        self.insert(KnowledgeNode {
            id: id::generate("node", rng),
            kind: node.kind,
            label: node.label,
            symbolic_sequence: node.symbolic_sequence,
            resonance: node.resonance,
            connections: Vec::new(),
            metadata: node.metadata,
        })
    }

    /// Link two nodes both ways. Idempotent.
    ///
    /// Returns `false` without changes if either id is unknown or both ids
    /// are the same node.
    pub fn connect_nodes(&mut self, a: &str, b: &str) -> bool {
        let (Some(&ia), Some(&ib)) = (self.index.get(a), self.index.get(b)) else {
            return false;
        };
        if ia == ib {
            return false;
        }

        let mut added = false;
        if !self.nodes[ia].connections.iter().any(|c| c == b) {
            self.nodes[ia].connections.push(b.to_string());
            added = true;
        }
        if !self.nodes[ib].connections.iter().any(|c| c == a) {
            self.nodes[ib].connections.push(a.to_string());
            added = true;
        }
        if added {
            debug!(a, b, "connected knowledge nodes");
        }
        true
    }

    pub fn get_connected_nodes(&self, id: &str) -> Vec<&KnowledgeNode> {
        self.get_node(id)
            .map(|node| {
                node.connections
                    .iter()
                    .filter_map(|c| self.get_node(c))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Node labelled after the bundle, resonance = mean sequence resonance,
    /// sequence = strongest sequence (first on ties).
    pub fn create_node_from_dna(&mut self, dna: &AgenticDna, rng: &mut impl Rng) -> &KnowledgeNode {
        let metadata = Metadata::from([("dnaId".to_string(), Value::from(dna.id.as_str()))]);
        self.add_node(
            NewNode {
                kind: NodeType::Symbolic,
                label: dna.name.clone(),
                symbolic_sequence: dna.strongest_sequence().map(|s| s.sequence.clone()),
                resonance: dna.mean_resonance(),
                metadata: Some(metadata),
            },
            rng,
        )
    }

    pub fn create_node_from_token(&mut self, token: &FluidToken, rng: &mut impl Rng) -> &KnowledgeNode {
        let short: String = token.id.chars().take(8).collect();
        let metadata = Metadata::from([("tokenId".to_string(), Value::from(token.id.as_str()))]);
        self.add_node(
            NewNode {
                kind: NodeType::Entity,
                label: format!("Fluid Token {short}"),
                symbolic_sequence: Some(token.symbolic_sequence.clone()),
                resonance: token.resonance,
                metadata: Some(metadata),
            },
            rng,
        )
    }

    /// Shortest path by hop count, both endpoints included. Empty if either
    /// id is unknown or the nodes are not connected.
    pub fn find_path(&self, start: &str, end: &str) -> Vec<&KnowledgeNode> {
        let (Some(&from), Some(&to)) = (self.index.get(start), self.index.get(end)) else {
            return Vec::new();
        };

        let mut parent: HashMap<usize, usize> = HashMap::new();
        let mut visited = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            if current == to {
                let mut path = vec![&self.nodes[current]];
                let mut cursor = current;
                while let Some(&prev) = parent.get(&cursor) {
                    path.push(&self.nodes[prev]);
                    cursor = prev;
                }
                path.reverse();
                return path;
            }
            for neighbor in &self.nodes[current].connections {
                let Some(&next) = self.index.get(neighbor) else {
                    continue;
                };
                if visited.insert(next) {
                    parent.insert(next, current);
                    queue.push_back(next);
                }
            }
        }

        Vec::new()
    }

    /// Three synchronous diffusion rounds:
    /// `r' = r + (Σ neighbor r · 0.2) / φ`.
    ///
    /// Works on a copy; node resonances are not modified. Values are not
    /// renormalized and may exceed 1.
    pub fn calculate_resonance_field(&self) -> ResonanceField {
        let mut field: Vec<f64> = self.nodes.iter().map(|n| n.resonance).collect();
        let neighbors: Vec<Vec<usize>> = self
            .nodes
            .iter()
            .map(|n| {
                n.connections
                    .iter()
                    .filter_map(|c| self.index.get(c).copied())
                    .collect()
            })
            .collect();

        for _ in 0..DIFFUSION_ROUNDS {
            field = field
                .iter()
                .zip(&neighbors)
                .map(|(own, links)| {
                    let inflow: f64 = links.iter().map(|&j| field[j] * DIFFUSION_SHARE).sum();
                    own + inflow / PHI
                })
                .collect();
        }

        ResonanceField(
            self.nodes
                .iter()
                .map(|n| n.id.clone())
                .zip(field)
                .collect(),
        )
    }
}
