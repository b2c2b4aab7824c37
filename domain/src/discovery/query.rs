//! Retrieval query built from the conversation.

use crate::conversation::entities::{ConversationTurn, Role, last_user_message};

/// Default number of ranked tools requested from discovery
pub const DEFAULT_TOP_K: usize = 7;

/// Default number of trailing turns scanned for tactical context
pub const DEFAULT_RECENT_TURNS: usize = 2;

const NO_RECENT_ACTIONS: &str = "No recent actions have been taken.";

/// What discovery searches with: the user's goal plus what just happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryQuery {
    /// Content of the most recent user turn
    pub goal: String,
    /// Rendered non-user turns from the tail of the conversation
    pub tactical_context: Vec<String>,
}

impl DiscoveryQuery {
    /// Build the query, or `None` when the conversation has no user turn.
    ///
    /// Only the last `recent_turns` turns are scanned for tactical context;
    /// user turns among them are skipped since the goal already covers them.
    pub fn from_conversation(turns: &[ConversationTurn], recent_turns: usize) -> Option<Self> {
        let goal = last_user_message(turns)?.to_string();

        let start = turns.len().saturating_sub(recent_turns);
        let tactical_context = turns[start..]
            .iter()
            .filter(|t| t.role != Role::User)
            .filter_map(render_tactical)
            .collect();

        Some(Self {
            goal,
            tactical_context,
        })
    }

    /// The text sent to the retriever.
    pub fn render(&self) -> String {
        let situation = if self.tactical_context.is_empty() {
            NO_RECENT_ACTIONS.to_string()
        } else {
            self.tactical_context.join("---")
        };
        format!(
            "**User's Current Goal:**\n{}\n\n**Immediate Situation (Last Agent/Tool Actions):**\n{}",
            self.goal, situation
        )
    }
}

fn render_tactical(turn: &ConversationTurn) -> Option<String> {
    if let Some(content) = turn.text() {
        return Some(format!("Role: {}\nContent: {}", turn.role, content));
    }
    if turn.has_tool_calls() {
        return Some(format!(
            "Role: {}\nAction: Called tools {}",
            turn.role,
            turn.tool_call_names().join(", ")
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::ToolCallRequest;

    #[test]
    fn test_no_user_turn_yields_none() {
        let turns = vec![ConversationTurn::system("sys")];
        assert!(DiscoveryQuery::from_conversation(&turns, 2).is_none());
    }

    #[test]
    fn test_render_without_recent_actions() {
        let turns = vec![ConversationTurn::user("What's the date?")];
        let query = DiscoveryQuery::from_conversation(&turns, DEFAULT_RECENT_TURNS).unwrap();
        assert_eq!(
            query.render(),
            "**User's Current Goal:**\nWhat's the date?\n\n\
             **Immediate Situation (Last Agent/Tool Actions):**\n\
             No recent actions have been taken."
        );
    }

    #[test]
    fn test_tactical_context_from_recent_turns() {
        let turns = vec![
            ConversationTurn::user("Save my notes"),
            ConversationTurn::assistant_tool_calls(
                None,
                vec![ToolCallRequest::new("c1", "file_list", "{}")],
            ),
            ConversationTurn::tool_result("c1", "file.list", "notes.txt"),
        ];

        let query = DiscoveryQuery::from_conversation(&turns, 2).unwrap();
        assert_eq!(query.goal, "Save my notes");
        assert_eq!(
            query.tactical_context,
            vec![
                "Role: assistant\nAction: Called tools file_list".to_string(),
                "Role: tool\nContent: notes.txt".to_string(),
            ]
        );
        assert!(query.render().contains("file_list---Role: tool"));
    }

    #[test]
    fn test_window_limits_tactical_context() {
        let turns = vec![
            ConversationTurn::assistant("old context"),
            ConversationTurn::user("goal"),
            ConversationTurn::assistant("recent"),
        ];
        let query = DiscoveryQuery::from_conversation(&turns, 2).unwrap();
        assert_eq!(query.tactical_context, vec!["Role: assistant\nContent: recent"]);
    }

    #[test]
    fn test_zero_window() {
        let turns = vec![
            ConversationTurn::user("goal"),
            ConversationTurn::assistant("recent"),
        ];
        let query = DiscoveryQuery::from_conversation(&turns, 0).unwrap();
        assert!(query.tactical_context.is_empty());
    }
}
