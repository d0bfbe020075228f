use crate::model::note::NewNote;

/// Built-in notes used to populate an empty database.
pub(crate) fn sample_notes() -> Vec<NewNote> {
    vec![
        NewNote::new(
            "Welcome to Notes App",
            "This is your first note! You can create, edit, and delete notes using this \
             application. Try searching for notes or using the pagination controls.",
        )
        .with_tags(["welcome", "tutorial"]),
        NewNote::new(
            "Meeting Notes - Project Kickoff",
            "Discussed project timeline, assigned team roles, and set up initial milestones. \
             Next meeting scheduled for Friday at 2 PM.",
        )
        .with_tags(["meeting", "project", "work"]),
        NewNote::new(
            "Shopping List",
            "Groceries needed: milk, bread, eggs, apples, chicken breast, rice, vegetables \
             for the week.",
        )
        .with_tags(["shopping", "groceries", "personal"]),
        NewNote::new(
            "Book Recommendations",
            "1. The Clean Coder by Robert Martin\n2. Design Patterns by Gang of Four\n\
             3. Refactoring by Martin Fowler",
        )
        .with_tags(["books", "programming", "learning"]),
        NewNote::new(
            "Workout Plan",
            "Monday: Chest and Triceps\nTuesday: Back and Biceps\nWednesday: Legs\n\
             Thursday: Shoulders\nFriday: Cardio",
        )
        .with_tags(["fitness", "health", "personal"]),
        NewNote::new(
            "Old Project Ideas",
            "Some old project ideas that might be worth revisiting in the future. \
             Archived for reference.",
        )
        .with_tags(["projects", "ideas", "archive"])
        .archived(true),
    ]
}
