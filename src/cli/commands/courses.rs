//! Courses and outline commands.

use crate::agent::{CourseOutlineTool, OutlineArgs};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::RagSystem;
use anyhow::Result;

/// List indexed courses.
pub async fn run_courses(settings: Settings) -> Result<()> {
    preflight::check(Operation::Browse)?;

    let rag = RagSystem::from_settings(&settings)?;
    let analytics = rag.course_analytics().await?;

    if analytics.course_titles.is_empty() {
        Output::info("No courses indexed yet.");
        Output::info("Import a catalog with: syllabus import <catalog.json>");
        return Ok(());
    }

    Output::header(&format!("Indexed Courses ({})", analytics.total_courses));
    println!();
    for title in &analytics.course_titles {
        Output::list_item(title);
    }
    println!();

    Ok(())
}

/// Print a course outline, resolving the name the same way the assistant does.
pub async fn run_outline(course: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let rag = RagSystem::from_settings(&settings)?;
    let output = CourseOutlineTool::new(rag.store().clone())
        .outline(&OutlineArgs {
            course_name: course.to_string(),
        })
        .await?;

    println!("\n{}\n", output.text);
    Ok(())
}
