use std::collections::HashSet;

use itertools::Itertools;

use crate::error::BinvizChartError;
use crate::filter::FilterModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// How a consumer joins the expressions of its linked providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Combinator::And => "&&",
            Combinator::Or => "||",
        }
    }
}

/// A visualization taking part in brushing and linking. It provides its own
/// filter models and consumes the filters of the nodes it links to.
#[derive(Debug, Clone, Default)]
pub struct FilterNode {
    pub name: String,
    pub filter_models: Vec<FilterModel>,
    pub links: Vec<NodeId>,
    pub brushes: Vec<NodeId>,
    pub combinator: Combinator,
}

/// Arena of linked visualizations
#[derive(Debug, Clone, Default)]
pub struct FilterGraph {
    nodes: Vec<FilterNode>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        self.nodes.push(FilterNode {
            name: name.into(),
            ..Default::default()
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Result<&FilterNode, BinvizChartError> {
        self.nodes
            .get(id.0)
            .ok_or(BinvizChartError::UnknownNode(id.0))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut FilterNode, BinvizChartError> {
        self.nodes
            .get_mut(id.0)
            .ok_or(BinvizChartError::UnknownNode(id.0))
    }

    /// Makes `consumer` filter by the models of `provider`
    pub fn link(&mut self, consumer: NodeId, provider: NodeId) -> Result<(), BinvizChartError> {
        self.node(provider)?;
        let node = self.node_mut(consumer)?;
        if !node.links.contains(&provider) {
            node.links.push(provider);
        }
        Ok(())
    }

    pub fn unlink(&mut self, consumer: NodeId, provider: NodeId) -> Result<(), BinvizChartError> {
        self.node_mut(consumer)?.links.retain(|id| *id != provider);
        Ok(())
    }

    /// Makes the filters of `source` show up as a brush in `target`
    pub fn link_brush(&mut self, target: NodeId, source: NodeId) -> Result<(), BinvizChartError> {
        self.node(source)?;
        let node = self.node_mut(target)?;
        if !node.brushes.contains(&source) {
            node.brushes.push(source);
        }
        Ok(())
    }

    pub fn set_combinator(
        &mut self,
        id: NodeId,
        combinator: Combinator,
    ) -> Result<(), BinvizChartError> {
        self.node_mut(id)?.combinator = combinator;
        Ok(())
    }

    /// Adds `model` to the node, or removes it when an equal model is already
    /// present. Returns whether the model is now active.
    pub fn toggle_filter(
        &mut self,
        id: NodeId,
        model: FilterModel,
    ) -> Result<bool, BinvizChartError> {
        let node = self.node_mut(id)?;
        match node.filter_models.iter().position(|m| *m == model) {
            Some(pos) => {
                node.filter_models.remove(pos);
                Ok(false)
            }
            None => {
                node.filter_models.push(model);
                Ok(true)
            }
        }
    }

    pub fn clear_filters(&mut self, id: NodeId) -> Result<(), BinvizChartError> {
        self.node_mut(id)?.filter_models.clear();
        Ok(())
    }

    /// Expression of `id` and everything it links to. Non-empty models of
    /// every non-root node are collected into `collected`.
    pub fn compose_recursive(
        &self,
        id: NodeId,
        visited: &mut HashSet<NodeId>,
        collected: &mut Vec<FilterModel>,
        is_root: bool,
    ) -> Result<String, BinvizChartError> {
        visited.insert(id);
        let node = self.node(id)?;

        let mut own = String::new();
        if !is_root {
            let models = node
                .filter_models
                .iter()
                .filter(|m| !m.is_empty())
                .collect_vec();
            if !models.is_empty() {
                own = format!("({})", models.iter().map(|m| m.render()).join(" || "));
                collected.extend(models.into_iter().cloned());
            }
        }

        let mut children = Vec::with_capacity(node.links.len());
        for link in &node.links {
            if visited.contains(link) {
                continue;
            }
            let child = self.compose_recursive(*link, visited, collected, false)?;
            if !child.is_empty() {
                children.push(child);
            }
        }
        let separator = format!(" {} ", node.combinator.symbol());
        let children = children.join(separator.as_str());

        Ok(match (own.is_empty(), children.is_empty()) {
            (false, false) => format!("({own} && ({children}))"),
            (true, false) => format!("({children})"),
            (false, true) => own,
            (true, true) => String::new(),
        })
    }

    /// Filter expression for the query of `id`
    pub fn filter_expression(&self, id: NodeId) -> Result<String, BinvizChartError> {
        self.compose_recursive(id, &mut HashSet::new(), &mut Vec::new(), true)
    }

    /// One expression per brush source linked into `id`, in link order
    pub fn brush_expressions(&self, id: NodeId) -> Result<Vec<String>, BinvizChartError> {
        let node = self.node(id)?;
        node.brushes
            .iter()
            .map(|source| {
                let mut visited = HashSet::from([id]);
                self.compose_recursive(*source, &mut visited, &mut Vec::new(), false)
            })
            .collect()
    }
}
