//! services/api/src/adapters/questions.rs
//!
//! Serves the technical-quiz question bank, either from a JSON file or from the
//! built-in default set. Implements the `QuestionBank` port.

use async_trait::async_trait;
use recruit_core::domain::AssessmentQuestion;
use recruit_core::ports::{PortError, PortResult, QuestionBank};
use std::path::PathBuf;
use tracing::info;

#[derive(Clone, Debug, Default)]
pub struct JsonQuestionBank {
    path: Option<PathBuf>,
}

impl JsonQuestionBank {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl QuestionBank for JsonQuestionBank {
    async fn load_questions(&self) -> PortResult<Vec<AssessmentQuestion>> {
        let Some(path) = &self.path else {
            return Ok(default_questions());
        };
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                PortError::NotFound(format!("Question bank {} not found", path.display()))
            }
            _ => PortError::Unexpected(e.to_string()),
        })?;
        let questions: Vec<AssessmentQuestion> = serde_json::from_str(&raw).map_err(|e| {
            PortError::Unexpected(format!("Invalid question bank {}: {}", path.display(), e))
        })?;
        info!("Loaded {} quiz questions from {}", questions.len(), path.display());
        Ok(questions)
    }
}

fn question(prompt: &str, options: [&str; 4], correct: usize, category: &str) -> AssessmentQuestion {
    AssessmentQuestion {
        prompt: prompt.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_option_index: correct,
        category: category.to_string(),
    }
}

/// The ten questions used when no bank file is configured.
pub fn default_questions() -> Vec<AssessmentQuestion> {
    vec![
        question(
            "What is the time complexity of binary search on a sorted array?",
            ["O(n)", "O(log n)", "O(n log n)", "O(1)"],
            1,
            "Algorithms",
        ),
        question(
            "Which data structure works on a Last-In-First-Out basis?",
            ["Queue", "Stack", "Linked list", "Heap"],
            1,
            "Data Structures",
        ),
        question(
            "Which HTTP method is idempotent and typically used to replace a resource?",
            ["POST", "PATCH", "PUT", "CONNECT"],
            2,
            "Web",
        ),
        question(
            "What does the CSS property `display: flex` enable?",
            ["Grid layout", "Flexbox layout", "Absolute positioning", "Floating"],
            1,
            "Web",
        ),
        question(
            "Which SQL clause filters rows after aggregation?",
            ["WHERE", "GROUP BY", "ORDER BY", "HAVING"],
            3,
            "Databases",
        ),
        question(
            "Which git command creates a new branch and switches to it?",
            ["git branch -d", "git checkout -b", "git merge", "git stash"],
            1,
            "Tooling",
        ),
        question(
            "What is the output of `typeof null` in JavaScript?",
            ["\"null\"", "\"undefined\"", "\"object\"", "\"number\""],
            2,
            "Programming",
        ),
        question(
            "Which protocol is connectionless?",
            ["TCP", "UDP", "HTTP/1.1", "SSH"],
            1,
            "Networking",
        ),
        question(
            "In object-oriented programming, what is encapsulation?",
            [
                "Inheriting behavior from a parent",
                "Bundling data with the methods that operate on it",
                "Having many forms of one interface",
                "Splitting a program into processes",
            ],
            1,
            "Programming",
        ),
        question(
            "Which sorting algorithm has the best worst-case time complexity?",
            ["Quick sort", "Bubble sort", "Insertion sort", "Merge sort"],
            3,
            "Algorithms",
        ),
    ]
}
