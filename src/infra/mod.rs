pub mod feedback_site;
