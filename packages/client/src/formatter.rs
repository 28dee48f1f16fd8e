//! Message formatting utilities for client display.

use rakugaki_server::{
    domain::OperationKind,
    infrastructure::dto::websocket::{OperationDto, ParticipantDto, PointDto},
};
use rakugaki_shared::time::timestamp_to_rfc3339;

const RULE: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the roster, marking the current user with "(me)"
    pub fn format_users(users: &[ParticipantDto], current_user_id: &str) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));
        output.push_str("Participants:\n");

        if users.is_empty() {
            output.push_str("(No participants)\n");
        } else {
            for user in users {
                let me_suffix = if user.user_id == current_user_id {
                    " (me)"
                } else {
                    ""
                };
                output.push_str(&format!(
                    "{} [{}]{} {} - joined at {}\n",
                    user.display_name,
                    user.user_id,
                    me_suffix,
                    user.color,
                    timestamp_to_rfc3339(user.joined_at)
                ));
            }
        }

        output.push_str(&format!("{}\n", RULE));
        output
    }

    /// Format the summary printed after a snapshot was applied
    pub fn format_init_state(total: usize, visible: usize) -> String {
        format!(
            "\n* synchronized: {} operations ({} visible)\n",
            total, visible
        )
    }

    /// Format a newly appended operation
    pub fn format_remote_operation(operation: &OperationDto, current_user_id: &str) -> String {
        let author = if operation.author_id == current_user_id {
            "you".to_string()
        } else {
            operation.author_id.clone()
        };
        format!(
            "\n+ {} {} {} ({} points, {}, width {})\n",
            author,
            verb(operation.kind),
            operation.id,
            operation.path.len(),
            operation.color,
            operation.width
        )
    }

    /// Format an undo/redo delta
    pub fn format_undo_redo(operation_id: &str, active: bool) -> String {
        if active {
            format!("\n↻ redo {}\n", operation_id)
        } else {
            format!("\n↺ undo {}\n", operation_id)
        }
    }

    /// Format an error reported by the server
    pub fn format_server_error(code: &str, message: &str) -> String {
        format!("\n! [{}] {}\n", code, message)
    }

    /// Format a notice that the local replica is resynchronizing
    pub fn format_resync(reason: &str) -> String {
        format!("\n~ out of sync ({}), requesting a fresh snapshot\n", reason)
    }

    /// Format the visible canvas and the live remote cursors (`show`)
    pub fn format_canvas(operations: &[OperationDto], cursors: &[(String, PointDto)]) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));

        let visible: Vec<&OperationDto> = operations.iter().filter(|op| op.active).collect();
        output.push_str(&format!(
            "Canvas: {} visible / {} total\n",
            visible.len(),
            operations.len()
        ));
        for op in &visible {
            let path: Vec<String> = op
                .path
                .iter()
                .map(|p| format!("{},{}", p.x, p.y))
                .collect();
            output.push_str(&format!(
                "  {} {} by {} {} w{}: {}\n",
                op.id,
                verb(op.kind),
                op.author_id,
                op.color,
                op.width,
                path.join(" ")
            ));
        }

        if !cursors.is_empty() {
            output.push_str("Cursors:\n");
            for (user_id, point) in cursors {
                output.push_str(&format!("  {} @ {},{}\n", user_id, point.x, point.y));
            }
        }

        output.push_str(&format!("{}\n", RULE));
        output
    }

    /// Format the brush settings after `color` / `width`
    pub fn format_brush(color: &str, width: f64) -> String {
        format!("brush: {} width {}\n", color, width)
    }

    /// Format the command list (`help`)
    pub fn format_help() -> String {
        [
            "",
            "Commands:",
            "  stroke x,y x,y ...   draw a stroke with the current brush",
            "  erase x,y x,y ...    erase along a path",
            "  color <c>            set brush color (e.g. #ff0000)",
            "  width <w>            set brush width",
            "  undo / redo          undo or redo the latest change in the room",
            "  move x,y             share your pointer position",
            "  sync                 request a fresh snapshot",
            "  who                  list participants",
            "  show                 print the canvas and live cursors",
            "  quit                 leave",
            "",
        ]
        .join("\n")
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }
}

fn verb(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Stroke => "stroke",
        OperationKind::Erase => "erase",
    }
}
