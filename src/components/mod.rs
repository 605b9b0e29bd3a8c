pub mod candidate_list;
