// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Per-operation helpers used by `Canvas::apply`.
/// Keeps `ops::mod` focused on public op types and dispatch.
impl Canvas {
    fn node_mut(&mut self, node_id: &NodeId) -> Result<&mut crate::model::Node, CanvasError> {
        self.graph
            .node_mut(node_id)
            .ok_or_else(|| CanvasError::NotFound { node_id: node_id.clone() })
    }

    fn answer_stream_state(
        &self,
        node_id: &NodeId,
    ) -> Result<crate::model::StreamState, CanvasError> {
        let node = self
            .graph
            .node(node_id)
            .ok_or_else(|| CanvasError::NotFound { node_id: node_id.clone() })?;
        node.data()
            .stream_state()
            .ok_or_else(|| CanvasError::NotAnAnswer { node_id: node_id.clone() })
    }

    fn create_node(
        &mut self,
        parent_id: &NodeId,
        data: NodeData,
        pinned: bool,
        highlight: Option<String>,
        delta: &mut DeltaBuilder,
    ) -> Result<Created, CanvasError> {
        if data.kind() == crate::model::NodeKind::Content {
            return Err(CanvasError::DuplicateRoot);
        }

        let view = self.visible();
        let placement = crate::layout::place_child(&view, parent_id, data.kind(), &self.config);
        let is_answer = data.stream_state().is_some();

        let node_id = self.graph.insert_node(data, placement.position, self.active_page);
        self.node_mut(&node_id)?.set_pinned(pinned);

        // Only a parent in the view placement saw gets linked.
        let edge_id = if view.node(parent_id).is_some() {
            let edge_id = self.graph.insert_edge(
                parent_id.clone(),
                placement.source_handle,
                node_id.clone(),
                placement.target_handle,
            );
            if is_answer {
                if let Some(edge) = self.graph.edge_mut(&edge_id) {
                    edge.set_state(crate::model::EdgeState::InProgress);
                }
            }
            Some(edge_id)
        } else {
            None
        };

        if let Some(text) = highlight {
            self.graph.insert_highlight(text, node_id.clone(), self.active_page);
        }

        delta.record_added(node_id.clone());
        tracing::info!(%node_id, %parent_id, page = self.active_page, "created node");

        Ok(Created {
            node_id,
            edge_id,
            position: placement.position,
            source_handle: placement.source_handle,
            target_handle: placement.target_handle,
        })
    }

    fn measure(
        &mut self,
        node_id: &NodeId,
        size: Size,
        delta: &mut DeltaBuilder,
    ) -> Result<(), CanvasError> {
        if !size.is_finite() || size.width < 0.0 || size.height < 0.0 {
            return Err(CanvasError::NonFiniteGeometry { node_id: node_id.clone() });
        }
        let previous_rect = {
            let node = self
                .graph
                .node(node_id)
                .ok_or_else(|| CanvasError::NotFound { node_id: node_id.clone() })?;
            self.config.node_rect(node)
        };
        self.node_mut(node_id)?.set_measured_size(Some(size));
        delta.record_updated(node_id.clone());

        // Settled nodes restack their root-side column; streaming ones only push overlaps.
        let settled = self
            .graph
            .node(node_id)
            .and_then(|node| node.data().stream_state())
            .map_or(true, |state| state.is_terminal());

        let view = self.visible();
        if self.graph.is_root(node_id) {
            if size.height > previous_rect.height {
                let outcome = crate::layout::absorb_root_growth(view, previous_rect, &self.config);
                self.graph.merge_geometry_from(&outcome.graph);
                delta.record_moved(outcome.moved);
            } else {
                let outcome = crate::layout::resolve_collisions(view, &self.config);
                self.graph.merge_geometry_from(&outcome.graph);
                delta.record_moved(outcome.moved);
            }
        } else if settled {
            let reflowed = crate::layout::reflow_side_chain(view, node_id, &self.config);
            let resolved = crate::layout::resolve_collisions(reflowed.graph, &self.config);
            self.graph.merge_geometry_from(&resolved.graph);
            delta.record_moved(reflowed.moved);
            delta.record_moved(resolved.moved);
        } else {
            let outcome = crate::layout::resolve_collisions(view, &self.config);
            self.graph.merge_geometry_from(&outcome.graph);
            delta.record_moved(outcome.moved);
        }
        Ok(())
    }

    /// Returns `false` when the chunk arrived after the stream ended and was dropped.
    fn append_answer(
        &mut self,
        node_id: &NodeId,
        chunk: &str,
        delta: &mut DeltaBuilder,
    ) -> Result<bool, CanvasError> {
        if self.answer_stream_state(node_id)?.is_terminal() {
            tracing::debug!(%node_id, "dropping chunk for a finished stream");
            return Ok(false);
        }
        if let NodeData::Answer { answer, streaming, .. } = self.node_mut(node_id)?.data_mut() {
            answer.push_str(chunk);
            *streaming = crate::model::StreamState::Streaming;
        }
        delta.record_updated(node_id.clone());
        Ok(true)
    }

    /// Ends a stream, settles the node's incoming edges and restacks its root-side column.
    ///
    /// Returns `false` if the stream had already ended.
    fn finish_stream(
        &mut self,
        node_id: &NodeId,
        cancelled: bool,
        delta: &mut DeltaBuilder,
    ) -> Result<bool, CanvasError> {
        if self.answer_stream_state(node_id)?.is_terminal() {
            return Ok(false);
        }
        let terminal = if cancelled {
            crate::model::StreamState::Cancelled
        } else {
            crate::model::StreamState::Finished
        };
        if let NodeData::Answer { streaming, .. } = self.node_mut(node_id)?.data_mut() {
            *streaming = terminal;
        }

        let incoming = self
            .graph
            .edges()
            .values()
            .filter(|edge| edge.target() == node_id)
            .map(|edge| edge.id().clone())
            .collect::<Vec<_>>();
        for edge_id in incoming {
            if let Some(edge) = self.graph.edge_mut(&edge_id) {
                edge.set_state(crate::model::EdgeState::Settled);
            }
        }
        delta.record_updated(node_id.clone());

        let reflowed = crate::layout::reflow_side_chain(self.visible(), node_id, &self.config);
        let resolved = crate::layout::resolve_collisions(reflowed.graph, &self.config);
        self.graph.merge_geometry_from(&resolved.graph);
        delta.record_moved(reflowed.moved);
        delta.record_moved(resolved.moved);

        tracing::info!(%node_id, cancelled, "answer stream ended");
        Ok(true)
    }

    fn complete_drag(
        &mut self,
        node_id: &NodeId,
        position: Point,
        delta: &mut DeltaBuilder,
    ) -> Result<DragVerdict, CanvasError> {
        if !position.is_finite() {
            return Err(CanvasError::NonFiniteGeometry { node_id: node_id.clone() });
        }
        let node = self
            .graph
            .node(node_id)
            .ok_or_else(|| CanvasError::NotFound { node_id: node_id.clone() })?;
        let proposed = crate::model::Rect::from_origin_size(position, self.config.node_size(node));

        let view = self.visible();
        let blocker = view
            .nodes()
            .values()
            .filter(|other| other.id() != node_id)
            .find(|other| self.config.node_rect(other).overlaps(&proposed));
        if let Some(blocker) = blocker {
            tracing::debug!(%node_id, blocker = %blocker.id(), "drag rejected: overlaps another node");
            return Ok(DragVerdict::Rejected);
        }

        self.node_mut(node_id)?.set_position(position);
        delta.record_moved([node_id.clone()]);

        let outcome = crate::layout::reroute_edges(self.visible(), node_id, &self.config);
        self.graph.merge_geometry_from(&outcome.graph);
        delta.record_rerouted(outcome.rerouted);
        Ok(DragVerdict::Accepted)
    }

    fn delete(&mut self, node_id: &NodeId, delta: &mut DeltaBuilder) -> Result<(), CanvasError> {
        if self.graph.is_root(node_id) {
            return Err(CanvasError::RootImmutable);
        }
        let removed = self
            .graph
            .remove_node(node_id)
            .ok_or_else(|| CanvasError::NotFound { node_id: node_id.clone() })?;
        tracing::info!(
            %node_id,
            edges = removed.edges.len(),
            highlights = removed.highlights.len(),
            "deleted node"
        );
        delta.record_removed(node_id.clone());
        delta.record_removed_edges(removed.edges);
        Ok(())
    }

    fn add_follow_up(
        &mut self,
        node_id: &NodeId,
        question: String,
        answer: String,
        delta: &mut DeltaBuilder,
    ) -> Result<(), CanvasError> {
        match self.node_mut(node_id)?.data_mut() {
            NodeData::Answer { follow_ups, .. } => {
                follow_ups.push(crate::model::FollowUp { question, answer });
                delta.record_updated(node_id.clone());
                Ok(())
            }
            _ => Err(CanvasError::NotAnAnswer { node_id: node_id.clone() }),
        }
    }
}
