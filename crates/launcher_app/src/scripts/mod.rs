pub mod print_projects;
